//! Courier geolocation types.
//!
//! One geolocation row is kept per order, recording where the courier stood
//! when the OTP was requested and where the code was finally confirmed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as supplied by the courier application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoPoint {
	pub latitude: Decimal,
	pub longitude: Decimal,
}

/// Per-order geolocation record, written by the OTP handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderGeolocation {
	pub order_id: i64,
	pub courier_id: i64,
	/// Where the courier stood when the OTP was sent to the receiver.
	pub at_client_point: Option<GeoPoint>,
	/// Where the OTP code was confirmed. Updated under row-level locking.
	pub code_sent_point: Option<GeoPoint>,
	pub created_at: DateTime<Utc>,
}
