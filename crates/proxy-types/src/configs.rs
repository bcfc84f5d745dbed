//! Adapter configuration shared by the config loader and the adapter factories.

use serde::{Deserialize, Serialize};

/// Selects a collaborator implementation and carries its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterConfig {
	/// Implementation name, e.g. `memory` or `evm`.
	#[serde(rename = "type")]
	pub adapter_type: String,
	/// Implementation specific parameters.
	#[serde(default = "empty_table")]
	pub params: toml::Value,
}

impl AdapterConfig {
	pub fn new(adapter_type: impl Into<String>, params: toml::Value) -> Self {
		Self {
			adapter_type: adapter_type.into(),
			params,
		}
	}

	/// In-memory adapter with no preloaded data.
	pub fn memory() -> Self {
		Self::new("memory", empty_table())
	}
}

impl Default for AdapterConfig {
	fn default() -> Self {
		Self::memory()
	}
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_adapter_config_defaults_params() {
		let config: AdapterConfig = toml::from_str(r#"type = "evm""#).unwrap();
		assert_eq!(config.adapter_type, "evm");
		assert!(config.params.as_table().unwrap().is_empty());
	}

	#[test]
	fn test_adapter_config_params() {
		let config: AdapterConfig = toml::from_str(
			r#"
			type = "evm"
			[params]
			rpc_url = "http://localhost:8545"
			"#,
		)
		.unwrap();
		assert_eq!(
			config.params.get("rpc_url").and_then(|v| v.as_str()),
			Some("http://localhost:8545")
		);
	}
}
