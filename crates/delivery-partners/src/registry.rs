//! Partner adapter registry.
//!
//! OTP backend selection is a tagged enum resolved once at construction:
//! handlers match on the adapter kind to pass partner-specific parameters,
//! instead of probing which capability an injected object happens to
//! implement. The registry is built once per process and read-only
//! afterwards.

use crate::freedom_bank_otp::FreedomBankOtpAdapter;
use crate::pos_terminal_otp::PosTerminalOtpAdapter;
use delivery_types::PartnerId;
use std::collections::HashMap;
use std::sync::Arc;

/// One OTP backend, tagged by kind.
pub enum OtpAdapter {
	FreedomBank(FreedomBankOtpAdapter),
	PosTerminal(PosTerminalOtpAdapter),
}

/// Mapping from partner id to one capability instance per operation.
#[derive(Default)]
pub struct PartnerAdapterRegistry {
	send_otp: HashMap<PartnerId, Arc<OtpAdapter>>,
	verify_otp: HashMap<PartnerId, Arc<OtpAdapter>>,
}

impl PartnerAdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers one adapter for both the send and verify operations of the
	/// given partner.
	pub fn register(&mut self, partner_id: PartnerId, adapter: Arc<OtpAdapter>) {
		self.send_otp.insert(partner_id, adapter.clone());
		self.verify_otp.insert(partner_id, adapter);
	}

	pub fn send_otp(&self, partner_id: PartnerId) -> Option<&OtpAdapter> {
		self.send_otp.get(&partner_id).map(Arc::as_ref)
	}

	pub fn verify_otp(&self, partner_id: PartnerId) -> Option<&OtpAdapter> {
		self.verify_otp.get(&partner_id).map(Arc::as_ref)
	}
}
