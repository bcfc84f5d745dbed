//! Price resolution.
//!
//! A query walks an ordered list of [`PriceSource`]s and returns the first
//! price any of them produces. The standard chain is:
//!
//! 1. the native asset, always one price unit;
//! 2. liquidity-pool tokens, priced by the LP valuator;
//! 3. the reference feed, when the underlying token has a symbol;
//! 4. the backing oracle, which always answers (possibly with `0`).
//!
//! Resolution never fails. Collaborator errors are logged and treated as
//! "no data".

use crate::state::ProxyState;
use async_trait::async_trait;
use proxy_types::{
	Address, AssetCatalog, BackingOracle, LpValuator, Price, ReferenceFeed, PRICE_UNIT, U256,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// A single price query against one committed state snapshot.
pub struct PriceQuery<'a> {
	asset: Address,
	state: &'a ProxyState,
	catalog: &'a dyn AssetCatalog,
	underlying: OnceCell<Address>,
}

impl<'a> PriceQuery<'a> {
	pub fn new(asset: Address, state: &'a ProxyState, catalog: &'a dyn AssetCatalog) -> Self {
		Self {
			asset,
			state,
			catalog,
			underlying: OnceCell::new(),
		}
	}

	pub fn asset(&self) -> Address {
		self.asset
	}

	pub fn state(&self) -> &ProxyState {
		self.state
	}

	/// Token the asset represents, looked up once per query.
	///
	/// An asset whose underlying cannot be determined stands for itself.
	pub async fn underlying(&self) -> Address {
		*self
			.underlying
			.get_or_init(|| async {
				match self.catalog.underlying(self.asset).await {
					Ok(Some(underlying)) => underlying,
					Ok(None) => self.asset,
					Err(e) => {
						warn!("Failed to look up underlying of {}: {}", self.asset, e);
						self.asset
					}
				}
			})
			.await
	}
}

/// One step of the precedence chain.
#[async_trait]
pub trait PriceSource: Send + Sync {
	fn name(&self) -> &'static str;

	/// Returns `None` to pass the query to the next source.
	async fn resolve(&self, query: &PriceQuery<'_>) -> Option<Price>;
}

/// The native asset is worth exactly one unit of itself.
pub struct NativeAssetSource {
	native_asset: Address,
}

impl NativeAssetSource {
	pub fn new(native_asset: Address) -> Self {
		Self { native_asset }
	}
}

#[async_trait]
impl PriceSource for NativeAssetSource {
	fn name(&self) -> &'static str {
		"native"
	}

	async fn resolve(&self, query: &PriceQuery<'_>) -> Option<Price> {
		(query.asset() == self.native_asset).then_some(PRICE_UNIT)
	}
}

/// Prices flagged liquidity-pool tokens.
///
/// A flagged asset never falls through to the symbol path; a valuator
/// failure resolves to `0`.
pub struct LpSource {
	valuator: Arc<dyn LpValuator>,
}

impl LpSource {
	pub fn new(valuator: Arc<dyn LpValuator>) -> Self {
		Self { valuator }
	}
}

#[async_trait]
impl PriceSource for LpSource {
	fn name(&self) -> &'static str {
		"lp"
	}

	async fn resolve(&self, query: &PriceQuery<'_>) -> Option<Price> {
		if !query.state().lp_flags.is_lp(&query.asset()) {
			return None;
		}

		match self.valuator.quote(query.asset()).await {
			Ok(price) => Some(price),
			Err(e) => {
				warn!("LP valuation failed for {}: {}", query.asset(), e);
				Some(U256::ZERO)
			}
		}
	}
}

/// Quotes the underlying's symbol against the base currency symbol.
pub struct ReferenceFeedSource {
	feed: Arc<dyn ReferenceFeed>,
	base_symbol: String,
}

impl ReferenceFeedSource {
	pub fn new(feed: Arc<dyn ReferenceFeed>, base_symbol: impl Into<String>) -> Self {
		Self {
			feed,
			base_symbol: base_symbol.into(),
		}
	}
}

#[async_trait]
impl PriceSource for ReferenceFeedSource {
	fn name(&self) -> &'static str {
		"reference"
	}

	async fn resolve(&self, query: &PriceQuery<'_>) -> Option<Price> {
		let underlying = query.underlying().await;
		let symbol = query.state().symbols.symbol_of(&underlying);
		if symbol.is_empty() {
			return None;
		}

		match self.feed.get_reference_data(symbol, &self.base_symbol).await {
			Ok(Some(data)) if data.is_usable() => Some(data.rate),
			Ok(_) => {
				debug!("No reference data for {}/{}", symbol, self.base_symbol);
				None
			}
			Err(e) => {
				warn!(
					"Reference feed query for {}/{} failed: {}",
					symbol, self.base_symbol, e
				);
				None
			}
		}
	}
}

/// Last resort: whatever the backing oracle stores for the underlying.
pub struct BackingOracleSource {
	oracle: Arc<dyn BackingOracle>,
}

impl BackingOracleSource {
	pub fn new(oracle: Arc<dyn BackingOracle>) -> Self {
		Self { oracle }
	}
}

#[async_trait]
impl PriceSource for BackingOracleSource {
	fn name(&self) -> &'static str {
		"backing"
	}

	async fn resolve(&self, query: &PriceQuery<'_>) -> Option<Price> {
		let underlying = query.underlying().await;
		match self.oracle.asset_prices(underlying).await {
			Ok(price) => Some(price),
			Err(e) => {
				warn!("Backing oracle query for {} failed: {}", underlying, e);
				Some(U256::ZERO)
			}
		}
	}
}

/// Ordered chain of price sources.
pub struct PriceResolver {
	sources: Vec<Box<dyn PriceSource>>,
	catalog: Arc<dyn AssetCatalog>,
}

impl PriceResolver {
	pub fn new(catalog: Arc<dyn AssetCatalog>) -> Self {
		Self {
			sources: Vec::new(),
			catalog,
		}
	}

	/// Appends a source; sources are tried in insertion order.
	pub fn with_source(mut self, source: Box<dyn PriceSource>) -> Self {
		self.sources.push(source);
		self
	}

	/// Native, LP, reference feed, backing oracle.
	pub fn standard(
		native_asset: Address,
		base_symbol: impl Into<String>,
		lp_valuator: Arc<dyn LpValuator>,
		reference_feed: Arc<dyn ReferenceFeed>,
		backing_oracle: Arc<dyn BackingOracle>,
		catalog: Arc<dyn AssetCatalog>,
	) -> Self {
		Self::new(catalog)
			.with_source(Box::new(NativeAssetSource::new(native_asset)))
			.with_source(Box::new(LpSource::new(lp_valuator)))
			.with_source(Box::new(ReferenceFeedSource::new(reference_feed, base_symbol)))
			.with_source(Box::new(BackingOracleSource::new(backing_oracle)))
	}

	pub fn source_names(&self) -> Vec<&'static str> {
		self.sources.iter().map(|source| source.name()).collect()
	}

	/// Resolves `asset` against `state`. Returns `0` when nothing answers.
	pub async fn resolve(&self, asset: Address, state: &ProxyState) -> Price {
		let query = PriceQuery::new(asset, state, self.catalog.as_ref());

		for source in &self.sources {
			if let Some(price) = source.resolve(&query).await {
				debug!("Resolved {} via {} source: {}", asset, source.name(), price);
				return price;
			}
		}

		debug!("No source resolved {}", asset);
		U256::ZERO
	}
}
