//! Partner integrations for the delivery order system.
//!
//! Each partner module holds a narrow client API trait (the seam the
//! adapters and tests depend on), a reqwest client implementing it, and an
//! adapter that validates inputs and normalizes the partner's heterogeneous
//! failures into a small closed set of errors. No retry logic lives here
//! except the single reactive token refresh of the CDEK client.

use thiserror::Error;

/// CDEK courier service: shipment creation with token lifecycle.
pub mod cdek;
/// Freedom-Bank one-time-password service.
pub mod freedom_bank_otp;
/// POS-terminal vendor registration service.
pub mod pos_terminal;
/// POS-terminal vendor one-time-password service.
pub mod pos_terminal_otp;
/// Partner-to-adapter registry consumed by the OTP handlers.
pub mod registry;

pub use registry::{OtpAdapter, PartnerAdapterRegistry};

/// Transport-level errors shared by all partner clients.
///
/// Adapters never surface this type directly; they wrap it into their own
/// error kinds so that callers see one taxonomy per partner.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The partner could not be reached or the response was unreadable.
	#[error("transport error: {0}")]
	Transport(String),
	/// The partner answered with an unexpected HTTP status.
	#[error("unexpected status {status}: {body}")]
	Status { status: u16, body: String },
}

impl ClientError {
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, ClientError::Status { status: 401, .. })
	}
}

impl From<reqwest::Error> for ClientError {
	fn from(err: reqwest::Error) -> Self {
		ClientError::Transport(err.to_string())
	}
}

/// Turns a non-success response into [`ClientError::Status`], logging the
/// failure together with its response body.
pub(crate) async fn check_status(
	client: &str,
	method: &str,
	url: &str,
	response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}
	let body = response.text().await.unwrap_or_default();
	tracing::error!(
		client,
		status_code = status.as_u16(),
		method,
		url,
		response = %body,
		"partner request failed"
	);
	Err(ClientError::Status {
		status: status.as_u16(),
		body,
	})
}
