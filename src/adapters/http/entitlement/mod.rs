//! HTTP surface for entitlement queries and payment webhooks.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::EntitlementAppState;
pub use routes::entitlement_router;
