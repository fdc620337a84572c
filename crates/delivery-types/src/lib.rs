//! Common types module for the delivery order system.
//!
//! This module defines the core data types shared by the status-transition
//! engine, the partner integrations and the persistence layer. It provides
//! a centralized location for shared types to keep the other crates
//! consistent with each other.

/// Geolocation value types and the per-order geolocation record.
pub mod geolocation;
/// Status history rows and transition audit records.
pub mod history;
/// The order aggregate, its delivery status and product types.
pub mod order;
/// Secure string type for credentials in configuration.
pub mod secret_string;
/// Status reference entity and the well-known status codes.
pub mod status;

pub use geolocation::{GeoPoint, OrderGeolocation};
pub use history::{Initiator, StatusHistoryRecord, TransitionAudit};
pub use order::{
	CourierService, DeliveryStatus, Order, Product, ProductType, RegistrationStatus,
};
pub use secret_string::SecretString;
pub use status::{codes, Status};

/// Identifier of a partner (bank or business) on whose behalf orders are
/// delivered. Partner identity selects which adapters apply to an order.
pub type PartnerId = i64;
