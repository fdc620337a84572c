//! Status-transition handlers.
//!
//! One handler per reachable status code. The controller resolves the
//! handler for the requested status and invokes it with the mutable order;
//! the handler performs its side effects (partner calls, product updates,
//! geolocation writes) and mutates the order in place. Handlers that manage
//! their own history rows opt out of the controller's append via
//! [`StatusHandler::writes_own_history`].

pub mod card_returned_to_bank;
pub mod new;
pub mod pos_terminal_registration;
pub mod send_otp;
pub mod transfer_to_cdek;
pub mod verify_otp;

use async_trait::async_trait;
use delivery_partners::cdek::CdekError;
use delivery_storage::StorageError;
use delivery_types::{Order, Status};
use thiserror::Error;

pub use card_returned_to_bank::CardReturnedToBankHandler;
pub use new::NewHandler;
pub use pos_terminal_registration::{
	LoggingRegistrationStatusSync, PosTerminalRegistrationHandler, RegistrationStatusSync,
	SyncError,
};
pub use send_otp::SendOtpHandler;
pub use transfer_to_cdek::TransferToCdekHandler;
pub use verify_otp::VerifyOtpHandler;

/// Errors surfaced by the status handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
	/// The transition payload was missing or malformed.
	#[error("{0}")]
	Validation(String),
	/// No OTP backend is registered for the order's partner.
	#[error("No OTP service for partner, partner_id: {0}")]
	PartnerNotFound(i64),
	/// Sending the one-time password failed.
	#[error("error during send OTP: {0}")]
	SendOtp(String),
	/// Verifying the one-time password failed for a reason other than a
	/// wrong code.
	#[error("error during verify otp: {0}")]
	VerifyOtp(String),
	/// The receiver supplied a wrong one-time password.
	#[error("wrong code")]
	WrongOtpCode,
	#[error(transparent)]
	Cdek(#[from] CdekError),
	/// The POS-terminal vendor rejected or failed the registration.
	#[error("registrate pos terminal error: {0}")]
	Registration(String),
	/// Registration is not allowed in the product's current state.
	#[error("not allowed start registration, current registration_status: {0}")]
	NotAllowRegistration(String),
	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// Business logic executed when an order enters one status.
#[async_trait]
pub trait StatusHandler: Send + Sync {
	async fn handle(
		&self,
		order: &mut Order,
		status: &Status,
		payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError>;

	/// Whether this handler persists its own status-history rows. When true
	/// the controller does not append the usual history row after a
	/// successful transition.
	fn writes_own_history(&self) -> bool {
		false
	}
}
