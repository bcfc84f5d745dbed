//! Configuration types for the price oracle proxy.

use proxy_types::{AdapterConfig, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
	pub proxy: ProxySettings,
	#[serde(default)]
	pub backing_oracle: AdapterConfig,
	#[serde(default)]
	pub reference_feed: AdapterConfig,
	#[serde(default)]
	pub lp_valuator: AdapterConfig,
	#[serde(default)]
	pub catalog: AdapterConfig,
	/// Underlying token address to reference feed symbol.
	#[serde(default)]
	pub symbols: HashMap<String, String>,
	/// Assets priced by the LP valuator.
	#[serde(default)]
	pub lp_assets: Vec<Address>,
	#[serde(default)]
	pub api: ApiConfig,
}

/// Construction parameters of the proxy itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
	pub admin: Address,
	#[serde(default)]
	pub guardian: Option<Address>,
	pub native_asset: Address,
	#[serde(default = "default_base_symbol")]
	pub base_symbol: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Read-only HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_base_symbol() -> String {
	"ETH".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
		[proxy]
		admin = "0x1111111111111111111111111111111111111111"
		native_asset = "0x2222222222222222222222222222222222222222"
	"#;

	#[test]
	fn test_defaults() {
		let config: ProxyConfig = toml::from_str(MINIMAL).unwrap();
		assert_eq!(config.proxy.base_symbol, "ETH");
		assert_eq!(config.proxy.log_level, "info");
		assert_eq!(config.proxy.guardian, None);
		assert_eq!(config.backing_oracle, AdapterConfig::memory());
		assert_eq!(config.lp_valuator.adapter_type, "memory");
		assert!(config.symbols.is_empty());
		assert!(config.lp_assets.is_empty());
		assert!(config.api.enabled);
		assert_eq!(config.api.port, 3000);
	}

	#[test]
	fn test_addresses_parse() {
		let config: ProxyConfig = toml::from_str(MINIMAL).unwrap();
		assert_eq!(config.proxy.admin, Address::repeat_byte(0x11));
		assert_eq!(config.proxy.native_asset, Address::repeat_byte(0x22));
	}
}
