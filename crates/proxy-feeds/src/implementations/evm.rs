//! # EVM collaborators
//!
//! Read-only adapters that query deployed contracts over JSON-RPC using
//! Alloy:
//! - `IStdReference.getReferenceData(base, quote)` for the reference feed
//! - `PriceOracle.assetPrices(token)` for the backing oracle
//! - `CToken.underlying()` for the asset catalog
//!
//! Every adapter takes `rpc_url`; the feed and oracle also take the
//! `address` of the contract they call.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use proxy_types::{
	Address, AssetCatalog, BackingOracle, FeedError, Price, ReferenceData, ReferenceFeed,
	Timestamp, U256,
};
use serde::Deserialize;
use tracing::debug;

// Solidity interfaces of the contracts queried by the adapters.
sol! {
	/// Band-style reference data.
	struct StdReferenceData {
		uint256 rate;
		uint256 lastUpdatedBase;
		uint256 lastUpdatedQuote;
	}

	#[sol(rpc)]
	interface IStdReference {
		function getReferenceData(string memory _base, string memory _quote)
			external
			view
			returns (StdReferenceData memory);
	}

	#[sol(rpc)]
	interface IPriceOracle {
		function getUnderlyingPrice(address cToken) external view returns (uint256);
		function assetPrices(address asset) external view returns (uint256);
	}

	#[sol(rpc)]
	interface ICToken {
		function underlying() external view returns (address);
	}
}

#[derive(Debug, Deserialize)]
struct ContractParams {
	rpc_url: String,
	address: String,
}

#[derive(Debug, Deserialize)]
struct RpcParams {
	rpc_url: String,
}

/// Reference feed backed by an `IStdReference` contract.
pub struct EvmReferenceFeed {
	contract: IStdReference::IStdReferenceInstance<DynProvider>,
}

impl EvmReferenceFeed {
	pub fn new(rpc_url: &str, address: Address) -> Result<Self, FeedError> {
		let provider = connect(rpc_url)?;
		Ok(Self {
			contract: IStdReference::new(address, provider),
		})
	}
}

#[async_trait]
impl ReferenceFeed for EvmReferenceFeed {
	async fn get_reference_data(
		&self,
		base: &str,
		quote: &str,
	) -> Result<Option<ReferenceData>, FeedError> {
		// The reference contract reverts for pairs it does not know
		let data = self
			.contract
			.getReferenceData(base.to_string(), quote.to_string())
			.call()
			.await
			.map_err(|e| FeedError::Call(format!("getReferenceData({}, {}): {}", base, quote, e)))?;

		debug!("Reference data for {}/{}: rate {}", base, quote, data.rate);

		Ok(Some(ReferenceData {
			rate: data.rate,
			last_updated_base: to_timestamp(data.lastUpdatedBase),
			last_updated_quote: to_timestamp(data.lastUpdatedQuote),
		}))
	}
}

/// Backing oracle backed by a Compound-style price oracle contract.
pub struct EvmBackingOracle {
	contract: IPriceOracle::IPriceOracleInstance<DynProvider>,
}

impl EvmBackingOracle {
	pub fn new(rpc_url: &str, address: Address) -> Result<Self, FeedError> {
		let provider = connect(rpc_url)?;
		Ok(Self {
			contract: IPriceOracle::new(address, provider),
		})
	}
}

#[async_trait]
impl BackingOracle for EvmBackingOracle {
	async fn get_underlying_price(&self, token: Address) -> Result<Price, FeedError> {
		self.contract
			.getUnderlyingPrice(token)
			.call()
			.await
			.map_err(|e| FeedError::Call(format!("getUnderlyingPrice({}): {}", token, e)))
	}

	async fn asset_prices(&self, token: Address) -> Result<Price, FeedError> {
		self.contract
			.assetPrices(token)
			.call()
			.await
			.map_err(|e| FeedError::Call(format!("assetPrices({}): {}", token, e)))
	}
}

/// Asset catalog that reads `underlying()` from each market token.
pub struct EvmAssetCatalog {
	provider: DynProvider,
}

impl EvmAssetCatalog {
	pub fn new(rpc_url: &str) -> Result<Self, FeedError> {
		Ok(Self {
			provider: connect(rpc_url)?,
		})
	}
}

#[async_trait]
impl AssetCatalog for EvmAssetCatalog {
	async fn underlying(&self, asset: Address) -> Result<Option<Address>, FeedError> {
		let market = ICToken::new(asset, self.provider.clone());
		let underlying = market
			.underlying()
			.call()
			.await
			.map_err(|e| FeedError::Call(format!("underlying() of {}: {}", asset, e)))?;

		Ok((!underlying.is_zero()).then_some(underlying))
	}
}

pub fn create_reference_feed(params: &toml::Value) -> Result<EvmReferenceFeed, FeedError> {
	let params: ContractParams = deserialize(params)?;
	EvmReferenceFeed::new(&params.rpc_url, parse_address(&params.address)?)
}

pub fn create_backing_oracle(params: &toml::Value) -> Result<EvmBackingOracle, FeedError> {
	let params: ContractParams = deserialize(params)?;
	EvmBackingOracle::new(&params.rpc_url, parse_address(&params.address)?)
}

pub fn create_catalog(params: &toml::Value) -> Result<EvmAssetCatalog, FeedError> {
	let params: RpcParams = deserialize(params)?;
	EvmAssetCatalog::new(&params.rpc_url)
}

fn connect(rpc_url: &str) -> Result<DynProvider, FeedError> {
	if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
		return Err(FeedError::Config(format!(
			"RPC URL must start with http:// or https://: {}",
			rpc_url
		)));
	}
	let url = rpc_url
		.parse()
		.map_err(|e| FeedError::Config(format!("Invalid RPC URL: {}", e)))?;

	Ok(ProviderBuilder::new().connect_http(url).erased())
}

fn to_timestamp(value: U256) -> Timestamp {
	Timestamp::try_from(value).unwrap_or(Timestamp::MAX)
}

fn deserialize<T: for<'de> Deserialize<'de>>(params: &toml::Value) -> Result<T, FeedError> {
	params
		.clone()
		.try_into()
		.map_err(|e| FeedError::Config(format!("Invalid EVM adapter params: {}", e)))
}

fn parse_address(value: &str) -> Result<Address, FeedError> {
	value
		.parse()
		.map_err(|e| FeedError::Config(format!("Invalid address '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timestamp_saturates() {
		assert_eq!(to_timestamp(U256::from(1_700_000_000u64)), 1_700_000_000);
		assert_eq!(to_timestamp(U256::MAX), Timestamp::MAX);
	}

	#[test]
	fn test_params_validation() {
		let missing_address: toml::Value =
			toml::from_str(r#"rpc_url = "http://localhost:8545""#).unwrap();
		assert!(matches!(
			create_reference_feed(&missing_address),
			Err(FeedError::Config(_))
		));

		let bad_url: toml::Value = toml::from_str(
			r#"
			rpc_url = "ws://localhost:8545"
			address = "0x1111111111111111111111111111111111111111"
			"#,
		)
		.unwrap();
		assert!(matches!(
			create_backing_oracle(&bad_url),
			Err(FeedError::Config(msg)) if msg.contains("http")
		));
	}

	#[test]
	fn test_adapters_build_without_connecting() {
		let params: toml::Value = toml::from_str(
			r#"
			rpc_url = "http://localhost:8545"
			address = "0x1111111111111111111111111111111111111111"
			"#,
		)
		.unwrap();
		assert!(create_reference_feed(&params).is_ok());
		assert!(create_backing_oracle(&params).is_ok());
		assert!(create_catalog(&params).is_ok());
	}
}
