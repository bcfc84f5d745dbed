//! Configuration loading for the price oracle proxy.
//!
//! Configuration is read from a TOML, JSON or YAML file (chosen by
//! extension), `${VAR}` references are substituted from the environment,
//! prefixed environment variables override a few common settings, and the
//! result is validated before it is handed out.

pub mod types;

pub use types::*;

use proxy_types::Address;
use regex::Regex;
use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(Self::Toml),
			Some("json") => Ok(Self::Json),
			Some("yaml") | Some("yml") => Ok(Self::Yaml),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "ORACLE_PROXY_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<ProxyConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		let mut config = self.load_from_file(file_path).await?;

		self.apply_env_overrides(&mut config)?;

		validate_config(&config)?;

		info!("Configuration loaded from {}", file_path);
		Ok(config)
	}

	/// Parses configuration text in the given format, with substitution,
	/// overrides and validation applied.
	pub fn load_str(&self, content: &str, format: ConfigFormat) -> Result<ProxyConfig, ConfigError> {
		let substituted = substitute_env_vars(content)?;
		let mut config = parse(&substituted, format)?;
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<ProxyConfig, ConfigError> {
		let path = Path::new(file_path);
		if !path.exists() {
			return Err(ConfigError::FileNotFound(file_path.to_string()));
		}

		let format = ConfigFormat::from_path(path)?;
		let content = tokio::fs::read_to_string(path).await?;

		let substituted_content = substitute_env_vars(&content)?;

		parse(&substituted_content, format)
	}

	fn apply_env_overrides(&self, config: &mut ProxyConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.proxy.log_level = log_level;
		}

		if let Ok(api_port) = env::var(format!("{}API_PORT", self.env_prefix)) {
			config.api.port = api_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid API port: {}", e)))?;
		}

		if let Ok(base_symbol) = env::var(format!("{}BASE_SYMBOL", self.env_prefix)) {
			debug!("Overriding base symbol from environment");
			config.proxy.base_symbol = base_symbol;
		}

		Ok(())
	}
}

fn parse(content: &str, format: ConfigFormat) -> Result<ProxyConfig, ConfigError> {
	match format {
		ConfigFormat::Toml => {
			toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		ConfigFormat::Json => {
			serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		ConfigFormat::Yaml => {
			serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
	}
}

/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Checks invariants serde cannot express.
pub fn validate_config(config: &ProxyConfig) -> Result<(), ConfigError> {
	if config.proxy.admin.is_zero() {
		return Err(ConfigError::ValidationError(
			"Admin must be a non-zero address".to_string(),
		));
	}

	if config.proxy.native_asset.is_zero() {
		return Err(ConfigError::ValidationError(
			"Native asset must be a non-zero address".to_string(),
		));
	}

	if config.proxy.base_symbol.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"Base symbol must not be empty".to_string(),
		));
	}

	for (name, adapter) in [
		("backing_oracle", &config.backing_oracle),
		("reference_feed", &config.reference_feed),
		("lp_valuator", &config.lp_valuator),
		("catalog", &config.catalog),
	] {
		if adapter.adapter_type.trim().is_empty() {
			return Err(ConfigError::ValidationError(format!(
				"Adapter type for {} must not be empty",
				name
			)));
		}
	}

	symbol_entries(config)?;

	let mut seen = HashSet::new();
	for asset in &config.lp_assets {
		if !seen.insert(*asset) {
			return Err(ConfigError::ValidationError(format!(
				"LP asset {} listed more than once",
				asset
			)));
		}
	}

	if config.api.enabled && config.api.port == 0 {
		return Err(ConfigError::ValidationError(
			"API port must be non-zero".to_string(),
		));
	}

	Ok(())
}

/// Parsed `[symbols]` table, sorted by token.
///
/// Two spellings of the same address are rejected.
pub fn symbol_entries(config: &ProxyConfig) -> Result<Vec<(Address, String)>, ConfigError> {
	let mut entries = Vec::with_capacity(config.symbols.len());
	let mut seen = HashSet::new();

	for (token, symbol) in &config.symbols {
		let address: Address = token.parse().map_err(|e| {
			ConfigError::ValidationError(format!("Invalid symbol token '{}': {}", token, e))
		})?;
		if !seen.insert(address) {
			return Err(ConfigError::ValidationError(format!(
				"Symbol for {} configured more than once",
				address
			)));
		}
		entries.push((address, symbol.clone()));
	}

	entries.sort_by_key(|(address, _)| *address);
	Ok(entries)
}
