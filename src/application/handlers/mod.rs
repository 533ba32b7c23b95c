//! Command and query handlers composing domain logic with ports.

pub mod billing;
pub mod entitlement;
