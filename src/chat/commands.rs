//! Chat command handlers.
//!
//! Two commands are registered with the host framework: `ntfy` forwards
//! arbitrary text to the publish path, `ntfy_test` sends a canned
//! diagnostic notification and reports the outcome. Each handler returns
//! the ordered replies for its invocation; an empty list means the command
//! was silently denied or dropped.

use tracing::warn;

use crate::bridge::outbound::{GateOutcome, OutboundGate};
use crate::chat::ChatCommandEvent;
use crate::config::NtfyConfig;
use crate::ntfy::NtfyError;

/// Handle the general `ntfy` command: forward the message body to the
/// publish path (auth check, trigger stripping, topic resolution).
pub async fn handle_publish(gate: &OutboundGate, event: &ChatCommandEvent) -> Vec<String> {
    let topic = gate.topic().unwrap_or_default().to_owned();
    match gate.try_publish(event, &event.message_str).await {
        GateOutcome::Denied | GateOutcome::NoTopic => Vec::new(),
        GateOutcome::Attempted(Ok(_)) => vec![format!("调用 ntfy :{topic} 成功")],
        GateOutcome::Attempted(Err(NtfyError::Rejected { status, body })) => {
            vec![format!("调用 ntfy :{topic} 失败（HTTP {status}）：{body}")]
        }
        GateOutcome::Attempted(Err(e)) => {
            vec![format!(
                "调用 ntfy :{topic} 时发生错误，请检查网络连接。错误详情: {e}"
            )]
        }
    }
}

/// Handle the `ntfy_test` command: publish a canned diagnostic message
/// through the full outbound path and report success or failure.
pub async fn handle_test(
    gate: &OutboundGate,
    config: &NtfyConfig,
    event: &ChatCommandEvent,
) -> Vec<String> {
    if let Err(e) = config.validate() {
        warn!(error = %e, "test command refused, config incomplete");
        return vec!["❌ ntfy 配置不完整，请检查配置".to_owned()];
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let body = format!(
        "测试消息发送成功！\n时间：{timestamp}\n发送者：{}",
        event.sender_name
    );

    match gate.try_publish(event, &body).await {
        GateOutcome::Denied | GateOutcome::NoTopic => Vec::new(),
        GateOutcome::Attempted(Ok(_)) => vec!["✅ ntfy 测试消息发送成功！".to_owned()],
        GateOutcome::Attempted(Err(e)) => {
            vec![format!("❌ ntfy 测试消息发送失败：{e}")]
        }
    }
}
