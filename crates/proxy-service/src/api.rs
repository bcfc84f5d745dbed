//! Read-only HTTP API.

use alloy_primitives::utils::format_ether;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::get,
	Router,
};
use proxy_config::ProxyConfig;
use proxy_core::PriceOracleProxy;
use proxy_types::Address;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

/// API server exposing price queries and the proxy's configuration.
pub struct ApiServer {
	host: String,
	port: u16,
	proxy: Arc<PriceOracleProxy>,
	adapters: AdapterTypes,
}

impl ApiServer {
	pub fn new(
		host: impl Into<String>,
		port: u16,
		proxy: Arc<PriceOracleProxy>,
		adapters: AdapterTypes,
	) -> Self {
		Self {
			host: host.into(),
			port,
			proxy,
			adapters,
		}
	}

	#[instrument(skip(self))]
	pub async fn run(self) -> anyhow::Result<()> {
		let app = router(self.proxy, self.adapters);

		let listener = tokio::net::TcpListener::bind(format!("{}:{}", self.host, self.port)).await?;

		info!("API server listening on {}:{}", self.host, self.port);

		axum::serve(listener, app).await?;

		Ok(())
	}
}

pub fn router(proxy: Arc<PriceOracleProxy>, adapters: AdapterTypes) -> Router {
	Router::new()
		.route("/health", get(health_check))
		.route("/prices/{asset}", get(get_price))
		.route("/config", get(get_config))
		.with_state(AppState {
			proxy,
			adapters: Arc::new(adapters),
		})
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Adapter implementation behind each collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterTypes {
	pub backing_oracle: String,
	pub reference_feed: String,
	pub lp_valuator: String,
	pub catalog: String,
}

impl AdapterTypes {
	pub fn from_config(config: &ProxyConfig) -> Self {
		Self {
			backing_oracle: config.backing_oracle.adapter_type.clone(),
			reference_feed: config.reference_feed.adapter_type.clone(),
			lp_valuator: config.lp_valuator.adapter_type.clone(),
			catalog: config.catalog.adapter_type.clone(),
		}
	}
}

#[derive(Clone)]
struct AppState {
	proxy: Arc<PriceOracleProxy>,
	adapters: Arc<AdapterTypes>,
}

#[derive(Debug, Serialize)]
struct PriceResponse {
	asset: Address,
	/// Price scaled by 10^18, as a decimal string.
	price: String,
	/// The same price in whole units.
	price_units: String,
	resolved_at: i64,
}

#[derive(Debug, Serialize)]
struct ConfigResponse {
	admin: Address,
	guardian: Option<Address>,
	native_asset: Address,
	base_symbol: String,
	adapters: AdapterTypes,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
	error: String,
}

async fn health_check() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

async fn get_price(
	State(state): State<AppState>,
	Path(asset): Path<String>,
) -> Result<Json<PriceResponse>, (StatusCode, Json<ErrorResponse>)> {
	let asset: Address = asset.parse().map_err(|e| {
		(
			StatusCode::BAD_REQUEST,
			Json(ErrorResponse {
				error: format!("Invalid asset address '{}': {}", asset, e),
			}),
		)
	})?;

	let price = state.proxy.get_underlying_price(asset).await;

	Ok(Json(PriceResponse {
		asset,
		price: price.to_string(),
		price_units: format_ether(price),
		resolved_at: chrono::Utc::now().timestamp(),
	}))
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
	Json(ConfigResponse {
		admin: state.proxy.admin(),
		guardian: state.proxy.guardian(),
		native_asset: state.proxy.native_asset(),
		base_symbol: state.proxy.base_symbol().to_string(),
		adapters: AdapterTypes::clone(&state.adapters),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proxy_feeds::implementations::memory::{MemoryBackingOracle, MemoryReferenceFeed};
	use proxy_types::units;

	const ADMIN: Address = Address::repeat_byte(1);
	const NATIVE: Address = Address::repeat_byte(0xee);
	const TOKEN: Address = Address::repeat_byte(0x33);

	async fn state() -> AppState {
		let oracle = Arc::new(MemoryBackingOracle::new());
		oracle.set_price(TOKEN, units(12)).await;
		let proxy = PriceOracleProxy::builder(
			ADMIN,
			oracle,
			Arc::new(MemoryReferenceFeed::new()),
			NATIVE,
		)
		.build();
		AppState {
			proxy: Arc::new(proxy),
			adapters: Arc::new(AdapterTypes {
				backing_oracle: "memory".to_string(),
				reference_feed: "evm".to_string(),
				lp_valuator: "memory".to_string(),
				catalog: "memory".to_string(),
			}),
		}
	}

	#[tokio::test]
	async fn test_get_price() {
		let Json(response) = get_price(State(state().await), Path(TOKEN.to_string()))
			.await
			.unwrap();
		assert_eq!(response.asset, TOKEN);
		assert_eq!(response.price, "12000000000000000000");
		assert_eq!(response.price_units, format_ether(units(12)));
	}

	#[tokio::test]
	async fn test_get_price_rejects_bad_address() {
		let result = get_price(State(state().await), Path("0x1234".to_string())).await;
		let (status, Json(body)) = result.err().unwrap();
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body.error.contains("0x1234"));
	}

	#[tokio::test]
	async fn test_get_config() {
		let Json(response) = get_config(State(state().await)).await;
		assert_eq!(response.admin, ADMIN);
		assert_eq!(response.guardian, None);
		assert_eq!(response.native_asset, NATIVE);
		assert_eq!(response.base_symbol, "ETH");
		assert_eq!(response.adapters.backing_oracle, "memory");
		assert_eq!(response.adapters.reference_feed, "evm");
	}

	#[test]
	fn test_adapter_types_from_config() {
		let mut config = proxy_config::ConfigLoader::new()
			.with_env_prefix("PROXY_API_TEST_")
			.load_str(
				r#"
				[proxy]
				admin = "0x1111111111111111111111111111111111111111"
				native_asset = "0x2222222222222222222222222222222222222222"
				"#,
				proxy_config::ConfigFormat::Toml,
			)
			.unwrap();
		config.reference_feed.adapter_type = "evm".to_string();

		let adapters = AdapterTypes::from_config(&config);
		assert_eq!(adapters.backing_oracle, "memory");
		assert_eq!(adapters.reference_feed, "evm");
		assert_eq!(adapters.catalog, "memory");
	}
}
