//! Collaborator traits consumed by the price resolver.
//!
//! None of these sources are audited by the proxy. Each adapter answers
//! synchronously from the resolver's point of view: a value, "no data", or
//! a [`FeedError`] that the resolver folds into "no data".

use crate::{
	common::{Address, Price, Timestamp},
	errors::FeedError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A quote from the reference feed for a `base/quote` symbol pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
	/// Rate of base in quote, already scaled by 10^18.
	pub rate: Price,
	pub last_updated_base: Timestamp,
	pub last_updated_quote: Timestamp,
}

impl ReferenceData {
	/// Whether the rate can be used as a price.
	///
	/// A zero rate is handled as "no data", so the query falls through.
	pub fn is_usable(&self) -> bool {
		!self.rate.is_zero()
	}
}

/// Legacy price store keyed by token.
#[async_trait]
pub trait BackingOracle: Send + Sync {
	/// Price of the token underlying a market token.
	async fn get_underlying_price(&self, token: Address) -> Result<Price, FeedError>;

	/// Raw price stored for a token. `0` means unknown.
	async fn asset_prices(&self, token: Address) -> Result<Price, FeedError>;
}

/// Third-party quote source addressed by symbol pair.
#[async_trait]
pub trait ReferenceFeed: Send + Sync {
	/// Returns `None` when the feed has no data for the pair.
	async fn get_reference_data(
		&self,
		base: &str,
		quote: &str,
	) -> Result<Option<ReferenceData>, FeedError>;
}

/// Valuation of liquidity-pool tokens.
#[async_trait]
pub trait LpValuator: Send + Sync {
	async fn quote(&self, pool: Address) -> Result<Price, FeedError>;
}

/// Maps a lending-market token to the token it represents.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
	/// Returns `None` when the asset's underlying cannot be determined.
	async fn underlying(&self, asset: Address) -> Result<Option<Address>, FeedError>;
}
