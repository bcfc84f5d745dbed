//! Builds a ready-to-serve proxy from configuration.

use anyhow::{Context, Result};
use proxy_config::{symbol_entries, ProxyConfig};
use proxy_core::PriceOracleProxy;
use proxy_feeds::{create_backing_oracle, create_catalog, create_lp_valuator, create_reference_feed};
use tracing::info;

/// Creates the collaborators named in `config`, constructs the proxy and
/// applies the initial guardian, symbols and LP flags as the admin.
pub async fn build_proxy(config: &ProxyConfig) -> Result<PriceOracleProxy> {
	let backing_oracle = create_backing_oracle(&config.backing_oracle)
		.context("Failed to create backing oracle")?;
	let reference_feed = create_reference_feed(&config.reference_feed)
		.context("Failed to create reference feed")?;
	let lp_valuator =
		create_lp_valuator(&config.lp_valuator).context("Failed to create LP valuator")?;
	let catalog = create_catalog(&config.catalog).context("Failed to create asset catalog")?;

	let admin = config.proxy.admin;
	let proxy = PriceOracleProxy::builder(
		admin,
		backing_oracle,
		reference_feed,
		config.proxy.native_asset,
	)
	.with_base_symbol(config.proxy.base_symbol.clone())
	.with_lp_valuator(lp_valuator)
	.with_catalog(catalog)
	.build();

	if let Some(guardian) = config.proxy.guardian {
		proxy
			.set_guardian(admin, Some(guardian))
			.await
			.context("Failed to set initial guardian")?;
	}

	let entries = symbol_entries(config)?;
	if !entries.is_empty() {
		let (tokens, symbols): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
		proxy
			.set_symbols(admin, &tokens, &symbols)
			.await
			.context("Failed to set initial symbols")?;
	}

	if !config.lp_assets.is_empty() {
		let flags = vec![true; config.lp_assets.len()];
		proxy
			.set_lps(admin, &config.lp_assets, &flags)
			.await
			.context("Failed to set initial LP flags")?;
	}

	info!(
		"Proxy ready: {} backing oracle, {} reference feed, {} symbols, {} LP assets",
		config.backing_oracle.adapter_type,
		config.reference_feed.adapter_type,
		config.symbols.len(),
		config.lp_assets.len()
	);

	Ok(proxy)
}
