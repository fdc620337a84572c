//! Configuration module for the delivery order system.
//!
//! Parses and validates the TOML configuration that wires partner endpoints,
//! credentials and the partner-to-OTP-backend mapping. Each partner section
//! is optional: an absent section simply means no adapter of that kind can
//! be built, which only becomes an error if a configured partner needs it.

use delivery_types::{PartnerId, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Parse error: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("Validation error: {0}")]
	Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	#[serde(default)]
	pub cdek: Option<CdekConfig>,
	#[serde(default)]
	pub freedom_bank_otp: Option<FreedomBankOtpConfig>,
	#[serde(default)]
	pub pos_terminal_otp: Option<PosTerminalOtpConfig>,
	#[serde(default)]
	pub pos_terminal: Option<PosTerminalConfig>,
	#[serde(default)]
	pub partners: Vec<PartnerConfig>,
}

/// CDEK courier service credentials (client-credentials grant).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CdekConfig {
	pub base_url: String,
	pub client_id: String,
	pub client_secret: SecretString,
}

/// Freedom-Bank OTP service, authenticated with HTTP basic auth.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreedomBankOtpConfig {
	pub base_url: String,
	pub username: String,
	pub password: SecretString,
}

/// POS-terminal vendor OTP endpoint, authenticated with a static header.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosTerminalOtpConfig {
	pub base_url: String,
	pub authorization: SecretString,
}

/// POS-terminal vendor registration endpoint.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosTerminalConfig {
	pub base_url: String,
	pub authorization: SecretString,
}

/// Maps one partner to the OTP backend serving its orders.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartnerConfig {
	pub id: PartnerId,
	pub otp: OtpKind,
}

/// Which OTP backend a partner uses.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
	FreedomBank,
	PosTerminal,
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		std::fs::read_to_string(path)?.parse()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		fn require(section: &str, field: &str, value: &str) -> Result<(), ConfigError> {
			if value.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"{section}.{field} must not be empty"
				)));
			}
			Ok(())
		}

		if let Some(cdek) = &self.cdek {
			require("cdek", "base_url", &cdek.base_url)?;
			require("cdek", "client_id", &cdek.client_id)?;
			if cdek.client_secret.is_empty() {
				return Err(ConfigError::Validation(
					"cdek.client_secret must not be empty".into(),
				));
			}
		}
		if let Some(otp) = &self.freedom_bank_otp {
			require("freedom_bank_otp", "base_url", &otp.base_url)?;
			require("freedom_bank_otp", "username", &otp.username)?;
		}
		if let Some(otp) = &self.pos_terminal_otp {
			require("pos_terminal_otp", "base_url", &otp.base_url)?;
		}
		if let Some(pos) = &self.pos_terminal {
			require("pos_terminal", "base_url", &pos.base_url)?;
		}

		let mut seen = std::collections::HashSet::new();
		for partner in &self.partners {
			if !seen.insert(partner.id) {
				return Err(ConfigError::Validation(format!(
					"duplicate partner id: {}",
					partner.id
				)));
			}
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const FULL: &str = r#"
		[cdek]
		base_url = "https://api.edu.cdek.ru/v2"
		client_id = "client"
		client_secret = "secret"

		[freedom_bank_otp]
		base_url = "https://otp.bank.example"
		username = "loggy"
		password = "pass"

		[pos_terminal_otp]
		base_url = "https://tms.example"
		authorization = "Basic abc"

		[pos_terminal]
		base_url = "https://tms.example"
		authorization = "Basic abc"

		[[partners]]
		id = 1
		otp = "freedom_bank"

		[[partners]]
		id = 2
		otp = "pos_terminal"
	"#;

	#[test]
	fn test_parse_full_config() {
		let config: Config = FULL.parse().unwrap();
		assert_eq!(config.partners.len(), 2);
		assert_eq!(config.partners[0].otp, OtpKind::FreedomBank);
		assert!(config.cdek.is_some());
	}

	#[test]
	fn test_sections_are_optional() {
		let config: Config = "".parse().unwrap();
		assert!(config.cdek.is_none());
		assert!(config.partners.is_empty());
	}

	#[test]
	fn test_empty_base_url_is_rejected() {
		let raw = r#"
			[cdek]
			base_url = ""
			client_id = "client"
			client_secret = "secret"
		"#;
		assert!(matches!(
			raw.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_unknown_otp_kind_is_rejected() {
		let raw = r#"
			[[partners]]
			id = 1
			otp = "carrier_pigeon"
		"#;
		assert!(matches!(raw.parse::<Config>(), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_duplicate_partner_id_is_rejected() {
		let raw = r#"
			[[partners]]
			id = 1
			otp = "freedom_bank"

			[[partners]]
			id = 1
			otp = "pos_terminal"
		"#;
		assert!(matches!(
			raw.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(FULL.as_bytes()).unwrap();
		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.partners.len(), 2);
	}
}
