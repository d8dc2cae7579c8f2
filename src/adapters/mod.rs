//! Adapters between the bridge core and a concrete chat surface.
//!
//! The hosting chat framework is out of scope; the CLI adapter stands in
//! for it, turning terminal input into command events and printing both
//! command replies and dispatched notifications.

pub mod cli;
