//! Application core — command grammar, dispatch, and port traits.
//!
//! Nothing here touches a pin.  Devices are reached only through the
//! traits in [`ports`], so the dispatcher is testable with mock bindings.

pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod ports;
