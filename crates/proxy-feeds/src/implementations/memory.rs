//! In-memory collaborators.
//!
//! Each adapter keeps its data in a map behind an async lock. Data can be
//! preloaded from the adapter's `params` table and changed at runtime
//! through the setters, which is how tests drive the resolver.

use async_trait::async_trait;
use proxy_types::{
	parse_price, Address, AssetCatalog, BackingOracle, FeedError, LpValuator, Price,
	ReferenceData, ReferenceFeed, Timestamp, U256,
};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Backing oracle keyed by token.
#[derive(Debug, Default)]
pub struct MemoryBackingOracle {
	prices: RwLock<HashMap<Address, Price>>,
}

impl MemoryBackingOracle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_prices(prices: HashMap<Address, Price>) -> Self {
		Self {
			prices: RwLock::new(prices),
		}
	}

	pub async fn set_price(&self, token: Address, price: Price) {
		self.prices.write().await.insert(token, price);
	}
}

#[async_trait]
impl BackingOracle for MemoryBackingOracle {
	async fn get_underlying_price(&self, token: Address) -> Result<Price, FeedError> {
		self.asset_prices(token).await
	}

	async fn asset_prices(&self, token: Address) -> Result<Price, FeedError> {
		Ok(self
			.prices
			.read()
			.await
			.get(&token)
			.copied()
			.unwrap_or(U256::ZERO))
	}
}

/// Reference feed keyed by `(base, quote)` symbol pair.
#[derive(Debug, Default)]
pub struct MemoryReferenceFeed {
	rates: RwLock<HashMap<(String, String), ReferenceData>>,
}

impl MemoryReferenceFeed {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn set_reference_data(
		&self,
		base: &str,
		quote: &str,
		rate: Price,
		last_updated_base: Timestamp,
		last_updated_quote: Timestamp,
	) {
		let data = ReferenceData {
			rate,
			last_updated_base,
			last_updated_quote,
		};
		self.rates
			.write()
			.await
			.insert((base.to_string(), quote.to_string()), data);
	}
}

#[async_trait]
impl ReferenceFeed for MemoryReferenceFeed {
	async fn get_reference_data(
		&self,
		base: &str,
		quote: &str,
	) -> Result<Option<ReferenceData>, FeedError> {
		Ok(self
			.rates
			.read()
			.await
			.get(&(base.to_string(), quote.to_string()))
			.copied())
	}
}

/// LP valuator with fixed quotes per pool. Unknown pools quote `0`.
#[derive(Debug, Default)]
pub struct MemoryLpValuator {
	quotes: RwLock<HashMap<Address, Price>>,
}

impl MemoryLpValuator {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn set_quote(&self, pool: Address, price: Price) {
		self.quotes.write().await.insert(pool, price);
	}
}

#[async_trait]
impl LpValuator for MemoryLpValuator {
	async fn quote(&self, pool: Address) -> Result<Price, FeedError> {
		Ok(self
			.quotes
			.read()
			.await
			.get(&pool)
			.copied()
			.unwrap_or(U256::ZERO))
	}
}

/// Market token to underlying token map.
#[derive(Debug, Default)]
pub struct MemoryAssetCatalog {
	markets: RwLock<HashMap<Address, Address>>,
}

impl MemoryAssetCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn register(&self, asset: Address, underlying: Address) {
		self.markets.write().await.insert(asset, underlying);
	}
}

#[async_trait]
impl AssetCatalog for MemoryAssetCatalog {
	async fn underlying(&self, asset: Address) -> Result<Option<Address>, FeedError> {
		Ok(self.markets.read().await.get(&asset).copied())
	}
}

#[derive(Debug, Default, Deserialize)]
struct PriceTableParams {
	#[serde(default)]
	prices: HashMap<String, String>,
	#[serde(default)]
	quotes: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReferenceParams {
	#[serde(default)]
	rates: Vec<RateParams>,
}

#[derive(Debug, Deserialize)]
struct RateParams {
	base: String,
	quote: String,
	rate: String,
	#[serde(default)]
	last_updated_base: Timestamp,
	#[serde(default)]
	last_updated_quote: Timestamp,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogParams {
	#[serde(default)]
	markets: HashMap<String, String>,
}

/// Builds a backing oracle from `prices = { "<token>" = "<price>" }`.
pub fn create_backing_oracle(params: &toml::Value) -> Result<MemoryBackingOracle, FeedError> {
	let params: PriceTableParams = deserialize(params)?;
	Ok(MemoryBackingOracle::with_prices(parse_price_table(
		&params.prices,
	)?))
}

/// Builds a reference feed from `[[rates]]` entries.
pub fn create_reference_feed(params: &toml::Value) -> Result<MemoryReferenceFeed, FeedError> {
	let params: ReferenceParams = deserialize(params)?;
	let mut rates = HashMap::new();
	for entry in params.rates {
		let data = ReferenceData {
			rate: parse_price(&entry.rate).map_err(FeedError::Config)?,
			last_updated_base: entry.last_updated_base,
			last_updated_quote: entry.last_updated_quote,
		};
		rates.insert((entry.base, entry.quote), data);
	}
	Ok(MemoryReferenceFeed {
		rates: RwLock::new(rates),
	})
}

/// Builds an LP valuator from `quotes = { "<pool>" = "<price>" }`.
pub fn create_lp_valuator(params: &toml::Value) -> Result<MemoryLpValuator, FeedError> {
	let params: PriceTableParams = deserialize(params)?;
	Ok(MemoryLpValuator {
		quotes: RwLock::new(parse_price_table(&params.quotes)?),
	})
}

/// Builds a catalog from `markets = { "<market>" = "<underlying>" }`.
pub fn create_catalog(params: &toml::Value) -> Result<MemoryAssetCatalog, FeedError> {
	let params: CatalogParams = deserialize(params)?;
	let mut markets = HashMap::new();
	for (market, underlying) in &params.markets {
		markets.insert(parse_address(market)?, parse_address(underlying)?);
	}
	Ok(MemoryAssetCatalog {
		markets: RwLock::new(markets),
	})
}

fn deserialize<T: for<'de> Deserialize<'de>>(params: &toml::Value) -> Result<T, FeedError> {
	params
		.clone()
		.try_into()
		.map_err(|e| FeedError::Config(format!("Invalid memory adapter params: {}", e)))
}

fn parse_price_table(table: &HashMap<String, String>) -> Result<HashMap<Address, Price>, FeedError> {
	table
		.iter()
		.map(|(token, price)| {
			Ok((
				parse_address(token)?,
				parse_price(price).map_err(FeedError::Config)?,
			))
		})
		.collect()
}

fn parse_address(value: &str) -> Result<Address, FeedError> {
	value
		.parse()
		.map_err(|e| FeedError::Config(format!("Invalid address '{}': {}", value, e)))
}
