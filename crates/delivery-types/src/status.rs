//! Status reference entity for the delivery lifecycle.
//!
//! Statuses are configuration data: they are created by migrations or
//! fixtures and never mutated by the transition engine. The `code` column is
//! the canonical identifier used by delivery graphs and handler dispatch.

use serde::{Deserialize, Serialize};

/// Immutable reference entity describing one named order status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Status {
	/// Database identifier, referenced by `Order::current_status_id`.
	pub id: i64,
	/// URL-friendly display identifier. Not used for dispatch.
	pub slug: String,
	/// Canonical status code; equals the `status` field of delivery graph
	/// steps and keys the handler registry.
	pub code: String,
	/// Human-readable name.
	pub name: String,
	/// Whether the status may be skipped in a partner's flow.
	pub is_optional: bool,
	/// Some statuses exist only for a specific partner.
	pub partner_id: Option<i64>,
}

/// Well-known status codes handled by the transition engine.
///
/// Delivery graphs may contain further partner-specific codes; these are the
/// ones with registered side-effecting handlers plus the fixed target of the
/// OTP verification flow.
pub mod codes {
	pub const NEW: &str = "new";
	pub const CARD_RETURNED_TO_BANK: &str = "card_returned_to_bank";
	pub const POS_TERMINAL_REGISTRATION: &str = "pos_terminal_registration";
	pub const SEND_OTP: &str = "send_otp";
	pub const VERIFY_OTP: &str = "verify_otp";
	pub const TRANSFER_TO_CDEK: &str = "transfer_to_cdek";
	/// Fixed next status the OTP verification handler advances to.
	pub const PHOTO_CAPTURING: &str = "photo_capturing";
}
