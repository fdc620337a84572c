//! Order aggregate and product types.
//!
//! The order is owned by the persistence layer; the transition engine
//! borrows it for the duration of a single transition call, mutates fields
//! in place and hands it back to be saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutable order aggregate for one financial-product delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	pub id: i64,
	/// Partner on whose behalf the product is delivered; selects adapters.
	pub partner_id: i64,
	/// The partner's own identifier for this order, used by the bank OTP flow.
	pub partner_order_id: String,
	/// Foreign key to the current `Status`.
	pub current_status_id: i64,
	/// Delivery graph this order moves along.
	pub delivery_graph_id: i64,
	/// Free-form status record kept for backward compatibility with older
	/// callers. Deliberately not unified with `current_status_id`: some
	/// handlers update one but not the other.
	pub delivery_status: DeliveryStatus,
	/// Track identifier assigned by an external courier service.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub track_number: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier_service: Option<CourierService>,
	pub receiver_name: String,
	pub receiver_phone_number: String,
	pub receiver_iin: String,
	/// Assigned courier, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier_id: Option<i64>,
	/// Full name of the assigned courier's user record.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier_full_name: Option<String>,
	/// Address of the delivery point, used for POS-terminal registration.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_point_address: Option<String>,
}

/// Legacy free-form delivery status record.
///
/// All fields are optional; the neutral shape (everything `None`) is what
/// recovery statuses reset to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeliveryStatus {
	pub status: Option<String>,
	pub datetime: Option<DateTime<Utc>>,
	pub reason: Option<String>,
	pub comment: Option<String>,
}

impl DeliveryStatus {
	/// The empty/neutral shape: `{status: null, datetime: null, reason: null,
	/// comment: null}`.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Fixed payload set when an order is handed off to CDEK.
	pub fn transfer_to_cdek() -> Self {
		Self {
			status: Some(crate::status::codes::TRANSFER_TO_CDEK.to_string()),
			..Self::default()
		}
	}
}

/// External courier services an order can be handed off to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourierService {
	Cdek,
}

impl fmt::Display for CourierService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CourierService::Cdek => write!(f, "cdek"),
		}
	}
}

/// The physical product an order delivers.
///
/// Attributes are polymorphic per product type (card PAN, POS-terminal
/// serials and merchant data, ...) and therefore kept as a JSON bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
	pub id: i64,
	pub order_id: i64,
	#[serde(rename = "type")]
	pub kind: ProductType,
	pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Product {
	/// The POS-terminal vendor's workflow identifier, once registration has
	/// been started.
	pub fn business_key(&self) -> Option<&str> {
		self.attributes.get("business_key").and_then(|v| v.as_str())
	}

	/// Current POS-terminal registration state, if the attribute is present
	/// and recognized.
	pub fn registration_status(&self) -> Option<RegistrationStatus> {
		self.attributes
			.get("registration_status")
			.and_then(|v| v.as_str())
			.and_then(RegistrationStatus::parse)
	}

	pub fn set_attribute(&mut self, key: &str, value: serde_json::Value) {
		self.attributes.insert(key.to_string(), value);
	}

	/// String attribute lookup for the registration request fields.
	pub fn attribute_str(&self, key: &str) -> Option<&str> {
		self.attributes.get(key).and_then(|v| v.as_str())
	}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
	Card,
	PosTerminal,
	GroupOfCards,
}

impl fmt::Display for ProductType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProductType::Card => write!(f, "card"),
			ProductType::PosTerminal => write!(f, "pos_terminal"),
			ProductType::GroupOfCards => write!(f, "group_of_cards"),
		}
	}
}

/// POS-terminal registration workflow states as reported by the vendor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
	Started,
	Completed,
	Canceled,
	TimeoutError,
}

impl RegistrationStatus {
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"STARTED" => Some(Self::Started),
			"COMPLETED" => Some(Self::Completed),
			"CANCELED" => Some(Self::Canceled),
			"TIMEOUT_ERROR" => Some(Self::TimeoutError),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Started => "STARTED",
			Self::Completed => "COMPLETED",
			Self::Canceled => "CANCELED",
			Self::TimeoutError => "TIMEOUT_ERROR",
		}
	}
}

impl fmt::Display for RegistrationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}
