//! Flipkit - Entitlement and credit metering for the reseller platform
//!
//! This crate implements tiered feature gating, pooled credit accounting,
//! and payment-event reconciliation behind the Flipkit dashboard.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
