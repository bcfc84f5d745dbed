//! Collaborator adapters for the price oracle proxy.
//!
//! This crate provides concrete implementations of the backing oracle,
//! reference feed, LP valuator and asset catalog traits, together with
//! factory functions that build them from an [`AdapterConfig`].
//!
//! Two families are available:
//! - `memory`: in-process maps, preloaded from configuration and mutable
//!   through setters
//! - `evm`: read-only contract calls over JSON-RPC

use proxy_types::{AdapterConfig, AssetCatalog, BackingOracle, FeedError, LpValuator, ReferenceFeed};
use std::sync::Arc;

/// Re-export implementations
pub mod implementations {
	pub mod evm;
	pub mod memory;
}

use implementations::{evm, memory};

/// Builds the backing oracle named by `config.adapter_type`.
pub fn create_backing_oracle(config: &AdapterConfig) -> Result<Arc<dyn BackingOracle>, FeedError> {
	match config.adapter_type.as_str() {
		"memory" => Ok(Arc::new(memory::create_backing_oracle(&config.params)?)),
		"evm" => Ok(Arc::new(evm::create_backing_oracle(&config.params)?)),
		other => Err(unknown_type("backing oracle", other)),
	}
}

/// Builds the reference feed named by `config.adapter_type`.
pub fn create_reference_feed(config: &AdapterConfig) -> Result<Arc<dyn ReferenceFeed>, FeedError> {
	match config.adapter_type.as_str() {
		"memory" => Ok(Arc::new(memory::create_reference_feed(&config.params)?)),
		"evm" => Ok(Arc::new(evm::create_reference_feed(&config.params)?)),
		other => Err(unknown_type("reference feed", other)),
	}
}

/// Builds the LP valuator named by `config.adapter_type`.
pub fn create_lp_valuator(config: &AdapterConfig) -> Result<Arc<dyn LpValuator>, FeedError> {
	match config.adapter_type.as_str() {
		"memory" => Ok(Arc::new(memory::create_lp_valuator(&config.params)?)),
		other => Err(unknown_type("LP valuator", other)),
	}
}

/// Builds the asset catalog named by `config.adapter_type`.
pub fn create_catalog(config: &AdapterConfig) -> Result<Arc<dyn AssetCatalog>, FeedError> {
	match config.adapter_type.as_str() {
		"memory" => Ok(Arc::new(memory::create_catalog(&config.params)?)),
		"evm" => Ok(Arc::new(evm::create_catalog(&config.params)?)),
		other => Err(unknown_type("asset catalog", other)),
	}
}

fn unknown_type(kind: &str, adapter_type: &str) -> FeedError {
	FeedError::Config(format!("Unknown {} type: {}", kind, adapter_type))
}
