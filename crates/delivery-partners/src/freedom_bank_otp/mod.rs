//! Freedom-Bank one-time-password integration.
//!
//! The bank keys OTP requests by the partner's own order identifier. A 200
//! response can still carry a business failure in its `payload` field; the
//! adapter maps `NOT_FOUND` to a bad request (wrong combination of phone and
//! request id) and `FAILURE` to a wrong-code rejection, so callers can tell
//! "wrong code" from "service unavailable".

pub mod client;

use crate::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use client::FreedomBankOtpClient;

/// Errors raised by the Freedom-Bank OTP adapter.
#[derive(Debug, Error)]
pub enum OtpError {
	/// Caller-supplied arguments were empty/malformed; no network call made.
	#[error("{0}")]
	Validation(String),
	/// The bank rejected the request or could not be reached.
	#[error("{0}")]
	BadRequest(String),
	/// The supplied OTP code was wrong.
	#[error("{0}")]
	WrongOtpCode(String),
}

/// Response body of the verify call.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VerifyResponse {
	#[serde(default)]
	pub payload: Option<String>,
}

/// Raw Freedom-Bank OTP API surface.
#[async_trait]
pub trait FreedomBankOtpApi: Send + Sync {
	async fn send(&self, request_id: &str) -> Result<(), ClientError>;

	async fn verify(&self, request_id: &str, otp_code: &str)
		-> Result<VerifyResponse, ClientError>;
}

/// Adapter between the OTP handlers and the bank's OTP service.
pub struct FreedomBankOtpAdapter {
	client: Arc<dyn FreedomBankOtpApi>,
}

impl FreedomBankOtpAdapter {
	pub fn new(client: Arc<dyn FreedomBankOtpApi>) -> Self {
		Self { client }
	}

	pub async fn send(&self, partner_order_id: &str) -> Result<(), OtpError> {
		if partner_order_id.is_empty() {
			return Err(OtpError::Validation("partner_order_id is required".into()));
		}

		self.client
			.send(partner_order_id)
			.await
			.map_err(|_| OtpError::BadRequest("can not send otp, bad request".into()))
	}

	pub async fn verify(&self, partner_order_id: &str, otp_code: &str) -> Result<(), OtpError> {
		if partner_order_id.is_empty() {
			return Err(OtpError::Validation("partner_order_id is required".into()));
		}
		if otp_code.is_empty() {
			return Err(OtpError::Validation("otp_code is required".into()));
		}

		let response = self
			.client
			.verify(partner_order_id, otp_code)
			.await
			.map_err(|_| OtpError::BadRequest("can not verify otp, bad request".into()))?;

		match response.payload.as_deref() {
			Some("NOT_FOUND") => Err(OtpError::BadRequest(
				"wrong combination of phone_number and request_id in client side".into(),
			)),
			Some("FAILURE") => Err(OtpError::WrongOtpCode(
				"wrong OTP, error OTP code verification in client side".into(),
			)),
			_ => Ok(()),
		}
	}
}
