//! Gateway webhook handling: signature verification, event envelope parsing,
//! and dispatch to per-event handlers.

pub mod dispatcher;
pub mod events;
pub mod signing;
