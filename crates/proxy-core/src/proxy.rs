//! The proxy facade: committed state, serialised writers and price queries.

use crate::{resolver::PriceResolver, state::ProxyState};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use proxy_types::{
	Address, AssetCatalog, BackingOracle, FeedError, LpValuator, Price, ReferenceFeed, Result,
	U256,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Quote currency of every reference feed query unless configured otherwise.
pub const DEFAULT_BASE_SYMBOL: &str = "ETH";

/// Price oracle proxy.
///
/// Reads take one snapshot of the committed state per query. Writes are
/// serialised; each one validates and applies its whole batch on a copy of
/// the state and then publishes the copy, or publishes nothing.
pub struct PriceOracleProxy {
	state: ArcSwap<ProxyState>,
	writer: Mutex<()>,
	resolver: PriceResolver,
	native_asset: Address,
	base_symbol: String,
}

impl PriceOracleProxy {
	pub fn builder(
		admin: Address,
		backing_oracle: Arc<dyn BackingOracle>,
		reference_feed: Arc<dyn ReferenceFeed>,
		native_asset: Address,
	) -> ProxyBuilder {
		ProxyBuilder::new(admin, backing_oracle, reference_feed, native_asset)
	}

	/// Price of `asset` scaled by 10^18, `0` when no source can price it.
	#[instrument(skip(self))]
	pub async fn get_underlying_price(&self, asset: Address) -> Price {
		let snapshot = self.state.load_full();
		self.resolver.resolve(asset, &snapshot).await
	}

	pub async fn set_admin(&self, caller: Address, new_admin: Address) -> Result<()> {
		self.update(|state| state.roles.set_admin(caller, new_admin))
			.await
	}

	pub async fn set_guardian(&self, caller: Address, new_guardian: Option<Address>) -> Result<()> {
		self.update(|state| state.roles.set_guardian(caller, new_guardian))
			.await
	}

	/// Writes underlying-token symbols. See [`crate::SymbolRegistry::set_symbols`].
	pub async fn set_symbols(
		&self,
		caller: Address,
		tokens: &[Address],
		symbols: &[String],
	) -> Result<()> {
		let written = self
			.update(|state| {
				let ProxyState { roles, symbols: registry, .. } = state;
				registry.set_symbols(roles, caller, tokens, symbols)
			})
			.await?;
		info!("{} wrote {} of {} symbol entries", caller, written, tokens.len());
		Ok(())
	}

	pub async fn set_lps(&self, caller: Address, assets: &[Address], flags: &[bool]) -> Result<()> {
		self.update(|state| {
			let ProxyState { roles, lp_flags, .. } = state;
			lp_flags.set_lps(roles, caller, assets, flags)
		})
		.await
	}

	pub fn admin(&self) -> Address {
		self.state.load().roles.admin()
	}

	pub fn guardian(&self) -> Option<Address> {
		self.state.load().roles.guardian()
	}

	/// Symbol configured for an underlying token, empty when unset.
	pub fn underlying_symbol(&self, token: Address) -> String {
		self.state.load().symbols.symbol_of(&token).to_string()
	}

	pub fn is_lp(&self, asset: Address) -> bool {
		self.state.load().lp_flags.is_lp(&asset)
	}

	pub fn native_asset(&self) -> Address {
		self.native_asset
	}

	pub fn base_symbol(&self) -> &str {
		&self.base_symbol
	}

	/// Current committed state.
	pub fn snapshot(&self) -> Arc<ProxyState> {
		self.state.load_full()
	}

	async fn update<T, F>(&self, apply: F) -> Result<T>
	where
		F: FnOnce(&mut ProxyState) -> Result<T>,
	{
		let _guard = self.writer.lock().await;
		let mut next = ProxyState::clone(&self.state.load_full());
		let output = apply(&mut next)?;
		self.state.store(Arc::new(next));
		Ok(output)
	}
}

/// Builder for [`PriceOracleProxy`].
///
/// Without an explicit catalog every asset is its own underlying; without an
/// LP valuator flagged pools price at `0`.
pub struct ProxyBuilder {
	admin: Address,
	native_asset: Address,
	backing_oracle: Arc<dyn BackingOracle>,
	reference_feed: Arc<dyn ReferenceFeed>,
	lp_valuator: Option<Arc<dyn LpValuator>>,
	catalog: Option<Arc<dyn AssetCatalog>>,
	base_symbol: String,
}

impl ProxyBuilder {
	pub fn new(
		admin: Address,
		backing_oracle: Arc<dyn BackingOracle>,
		reference_feed: Arc<dyn ReferenceFeed>,
		native_asset: Address,
	) -> Self {
		Self {
			admin,
			native_asset,
			backing_oracle,
			reference_feed,
			lp_valuator: None,
			catalog: None,
			base_symbol: DEFAULT_BASE_SYMBOL.to_string(),
		}
	}

	pub fn with_base_symbol(mut self, base_symbol: impl Into<String>) -> Self {
		self.base_symbol = base_symbol.into();
		self
	}

	pub fn with_lp_valuator(mut self, lp_valuator: Arc<dyn LpValuator>) -> Self {
		self.lp_valuator = Some(lp_valuator);
		self
	}

	pub fn with_catalog(mut self, catalog: Arc<dyn AssetCatalog>) -> Self {
		self.catalog = Some(catalog);
		self
	}

	pub fn build(self) -> PriceOracleProxy {
		let resolver = PriceResolver::standard(
			self.native_asset,
			self.base_symbol.clone(),
			self.lp_valuator.unwrap_or_else(|| Arc::new(Unquoted)),
			self.reference_feed,
			self.backing_oracle,
			self.catalog.unwrap_or_else(|| Arc::new(SelfUnderlying)),
		);

		info!(
			"Price oracle proxy created with admin {}, native asset {}, base symbol {}",
			self.admin, self.native_asset, self.base_symbol
		);

		PriceOracleProxy {
			state: ArcSwap::from_pointee(ProxyState::new(self.admin)),
			writer: Mutex::new(()),
			resolver,
			native_asset: self.native_asset,
			base_symbol: self.base_symbol,
		}
	}
}

struct Unquoted;

#[async_trait]
impl LpValuator for Unquoted {
	async fn quote(&self, _pool: Address) -> std::result::Result<Price, FeedError> {
		Ok(U256::ZERO)
	}
}

struct SelfUnderlying;

#[async_trait]
impl AssetCatalog for SelfUnderlying {
	async fn underlying(&self, asset: Address) -> std::result::Result<Option<Address>, FeedError> {
		Ok(Some(asset))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proxy_feeds::implementations::memory::{MemoryBackingOracle, MemoryReferenceFeed};
	use proxy_types::{units, ProxyError, PRICE_UNIT};

	const ADMIN: Address = Address::repeat_byte(1);
	const GUARDIAN: Address = Address::repeat_byte(2);
	const NATIVE: Address = Address::repeat_byte(0xee);
	const TOKEN: Address = Address::repeat_byte(0xd1);

	fn proxy() -> (PriceOracleProxy, Arc<MemoryBackingOracle>) {
		let oracle = Arc::new(MemoryBackingOracle::new());
		let proxy = PriceOracleProxy::builder(
			ADMIN,
			oracle.clone(),
			Arc::new(MemoryReferenceFeed::new()),
			NATIVE,
		)
		.build();
		(proxy, oracle)
	}

	#[tokio::test]
	async fn test_construction() {
		let (proxy, _) = proxy();
		assert_eq!(proxy.admin(), ADMIN);
		assert_eq!(proxy.guardian(), None);
		assert_eq!(proxy.native_asset(), NATIVE);
		assert_eq!(proxy.base_symbol(), DEFAULT_BASE_SYMBOL);
		assert_eq!(proxy.get_underlying_price(NATIVE).await, PRICE_UNIT);
	}

	#[tokio::test]
	async fn test_failed_write_publishes_nothing() {
		let (proxy, _) = proxy();
		proxy.set_guardian(ADMIN, Some(GUARDIAN)).await.unwrap();
		proxy
			.set_symbols(ADMIN, &[TOKEN], &["OTHER".to_string()])
			.await
			.unwrap();
		let before = proxy.snapshot();

		let result = proxy
			.set_symbols(ADMIN, &[TOKEN, NATIVE], &["BTC".to_string()])
			.await;
		assert!(matches!(result, Err(ProxyError::MismatchedData { .. })));

		let result = proxy
			.set_symbols(GUARDIAN, &[TOKEN], &["BTC".to_string()])
			.await;
		assert!(matches!(result, Err(ProxyError::PermissionDenied { .. })));

		let result = proxy.set_lps(GUARDIAN, &[TOKEN], &[true]).await;
		assert!(matches!(result, Err(ProxyError::PermissionDenied { .. })));

		assert_eq!(*proxy.snapshot(), *before);
		assert_eq!(proxy.underlying_symbol(TOKEN), "OTHER");
	}

	#[tokio::test]
	async fn test_admin_transfer() {
		let (proxy, _) = proxy();
		let new_admin = Address::repeat_byte(9);
		proxy.set_admin(ADMIN, new_admin).await.unwrap();

		assert_eq!(proxy.admin(), new_admin);
		assert!(proxy.set_lps(ADMIN, &[TOKEN], &[true]).await.is_err());
		proxy.set_lps(new_admin, &[TOKEN], &[true]).await.unwrap();
		assert!(proxy.is_lp(TOKEN));
	}

	#[tokio::test]
	async fn test_prices_are_not_cached() {
		let (proxy, oracle) = proxy();
		oracle.set_price(TOKEN, units(11)).await;
		assert_eq!(proxy.get_underlying_price(TOKEN).await, units(11));

		oracle.set_price(TOKEN, units(37)).await;
		assert_eq!(proxy.get_underlying_price(TOKEN).await, units(37));
	}

	#[tokio::test]
	async fn test_flagged_pool_without_valuator_prices_zero() {
		let (proxy, oracle) = proxy();
		oracle.set_price(TOKEN, units(5)).await;
		proxy.set_lps(ADMIN, &[TOKEN], &[true]).await.unwrap();

		assert_eq!(proxy.get_underlying_price(TOKEN).await, U256::ZERO);
	}
}
