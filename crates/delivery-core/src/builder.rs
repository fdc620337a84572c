//! Builder wiring configuration into a transition controller.
//!
//! Construct-once composition root: builds each partner client, wraps it in
//! its adapter, resolves the partner-to-OTP-backend mapping into the
//! registry, and registers one handler per status code. Components are
//! built eagerly so a missing credential fails at startup, not mid
//! transition.

use crate::controller::TransitionController;
use crate::handlers::{
	CardReturnedToBankHandler, LoggingRegistrationStatusSync, NewHandler,
	PosTerminalRegistrationHandler, RegistrationStatusSync, SendOtpHandler, StatusHandler,
	TransferToCdekHandler, VerifyOtpHandler,
};
use delivery_config::{Config, OtpKind};
use delivery_partners::cdek::{CdekAdapter, CdekClient};
use delivery_partners::freedom_bank_otp::{FreedomBankOtpAdapter, FreedomBankOtpClient};
use delivery_partners::pos_terminal::{PosTerminalAdapter, PosTerminalClient};
use delivery_partners::pos_terminal_otp::{PosTerminalOtpAdapter, PosTerminalOtpClient};
use delivery_partners::{OtpAdapter, PartnerAdapterRegistry};
use delivery_storage::OrderStore;
use delivery_types::status::codes;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the transition engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	/// A configured partner references a backend whose config section is
	/// absent.
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for the transition controller and its partner stack.
pub struct TransitionEngineBuilder {
	config: Config,
	store: Arc<dyn OrderStore>,
	registration_sync: Arc<dyn RegistrationStatusSync>,
}

impl TransitionEngineBuilder {
	pub fn new(config: Config, store: Arc<dyn OrderStore>) -> Self {
		Self {
			config,
			store,
			registration_sync: Arc::new(LoggingRegistrationStatusSync),
		}
	}

	/// Replaces the registration-status sync hook, e.g. with a real task
	/// queue publisher.
	pub fn with_registration_status_sync(mut self, sync: Arc<dyn RegistrationStatusSync>) -> Self {
		self.registration_sync = sync;
		self
	}

	pub fn build(self) -> Result<TransitionController, BuilderError> {
		let registry = Arc::new(self.build_registry()?);

		let mut handlers: HashMap<String, Arc<dyn StatusHandler>> = HashMap::new();
		handlers.insert(
			codes::NEW.into(),
			Arc::new(NewHandler::new(self.store.clone())),
		);
		handlers.insert(
			codes::CARD_RETURNED_TO_BANK.into(),
			Arc::new(CardReturnedToBankHandler::new()),
		);
		handlers.insert(
			codes::SEND_OTP.into(),
			Arc::new(SendOtpHandler::new(self.store.clone(), registry.clone())),
		);
		handlers.insert(
			codes::VERIFY_OTP.into(),
			Arc::new(VerifyOtpHandler::new(self.store.clone(), registry.clone())),
		);

		if let Some(cdek) = &self.config.cdek {
			let client = Arc::new(CdekClient::new(
				cdek.base_url.clone(),
				cdek.client_id.clone(),
				cdek.client_secret.clone(),
			));
			handlers.insert(
				codes::TRANSFER_TO_CDEK.into(),
				Arc::new(TransferToCdekHandler::new(Arc::new(CdekAdapter::new(
					client,
				)))),
			);
			tracing::info!(component = "partner", implementation = "cdek", "Loaded");
		}

		if let Some(pos_terminal) = &self.config.pos_terminal {
			let client = Arc::new(PosTerminalClient::new(
				pos_terminal.base_url.clone(),
				pos_terminal.authorization.clone(),
			));
			handlers.insert(
				codes::POS_TERMINAL_REGISTRATION.into(),
				Arc::new(PosTerminalRegistrationHandler::new(
					self.store.clone(),
					Arc::new(PosTerminalAdapter::new(client)),
					self.registration_sync.clone(),
				)),
			);
			tracing::info!(component = "partner", implementation = "pos_terminal", "Loaded");
		}

		for code in handlers.keys() {
			tracing::info!(component = "handler", status = %code, "Loaded");
		}

		Ok(TransitionController::new(self.store, handlers))
	}

	fn build_registry(&self) -> Result<PartnerAdapterRegistry, BuilderError> {
		let freedom_bank = self.config.freedom_bank_otp.as_ref().map(|otp| {
			let client = Arc::new(FreedomBankOtpClient::new(
				otp.base_url.clone(),
				otp.username.clone(),
				otp.password.clone(),
			));
			Arc::new(OtpAdapter::FreedomBank(FreedomBankOtpAdapter::new(client)))
		});
		let pos_terminal = self.config.pos_terminal_otp.as_ref().map(|otp| {
			let client = Arc::new(PosTerminalOtpClient::new(
				otp.base_url.clone(),
				otp.authorization.clone(),
			));
			Arc::new(OtpAdapter::PosTerminal(PosTerminalOtpAdapter::new(client)))
		});

		let mut registry = PartnerAdapterRegistry::new();
		for partner in &self.config.partners {
			let adapter = match partner.otp {
				OtpKind::FreedomBank => freedom_bank.clone().ok_or_else(|| {
					BuilderError::MissingComponent(format!(
						"partner {} requires the freedom_bank_otp section",
						partner.id
					))
				})?,
				OtpKind::PosTerminal => pos_terminal.clone().ok_or_else(|| {
					BuilderError::MissingComponent(format!(
						"partner {} requires the pos_terminal_otp section",
						partner.id
					))
				})?,
			};
			registry.register(partner.id, adapter);
			tracing::info!(
				component = "otp",
				partner_id = partner.id,
				"Registered OTP backend"
			);
		}
		Ok(registry)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use delivery_storage::implementations::memory::MemoryStore;

	fn config(with_bank: bool) -> Config {
		let mut toml = String::from(
			r#"
[cdek]
base_url = "https://api.edu.cdek.ru/v2"
client_id = "client"
client_secret = "secret"

[[partners]]
id = 1
otp = "freedom_bank"
"#,
		);
		if with_bank {
			toml.push_str(
				r#"
[freedom_bank_otp]
base_url = "https://otp.bank.example"
username = "svc"
password = "pw"
"#,
			);
		}
		toml.parse().unwrap()
	}

	#[test]
	fn test_build_with_full_config() {
		let builder =
			TransitionEngineBuilder::new(config(true), Arc::new(MemoryStore::new()));
		builder.build().unwrap();
	}

	#[test]
	fn test_partner_without_backend_section_fails() {
		let builder =
			TransitionEngineBuilder::new(config(false), Arc::new(MemoryStore::new()));
		let err = builder.build().unwrap_err();
		assert!(err.to_string().contains("freedom_bank_otp"));
	}
}
