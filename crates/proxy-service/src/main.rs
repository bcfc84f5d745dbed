use alloy_primitives::utils::format_ether;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use proxy_config::{ConfigLoader, ProxyConfig};
use proxy_types::Address;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{
	layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

mod api;
mod bootstrap;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser)]
#[command(name = "oracle-proxy")]
#[command(about = "Price oracle proxy", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(
		short,
		long,
		value_name = "FILE",
		env = "ORACLE_PROXY_CONFIG",
		default_value = "config/example.toml"
	)]
	config: PathBuf,

	/// Overrides the log level from the configuration file
	#[arg(long, env = "ORACLE_PROXY_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Serve prices over HTTP
	Serve,
	/// Resolve the price of one or more assets and exit
	Price {
		#[arg(required = true)]
		assets: Vec<String>,
	},
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let filter_handle = setup_tracing(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))?;

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

	let env_filter_set = std::env::var(EnvFilter::DEFAULT_ENV).is_ok();
	if let Some(log_level) = file_log_level(&cli, &config, env_filter_set) {
		filter_handle
			.reload(EnvFilter::new(log_level))
			.context("Failed to apply configured log level")?;
	}

	match cli.command {
		Some(Commands::Serve) | None => serve(config).await,
		Some(Commands::Price { assets }) => print_prices(config, &assets).await,
		Some(Commands::Validate) => validate_config(&cli, &config),
	}
}

async fn serve(config: ProxyConfig) -> Result<()> {
	if !config.api.enabled {
		bail!("API is disabled in the configuration; nothing to serve");
	}

	info!("Starting price oracle proxy");

	let proxy = Arc::new(
		bootstrap::build_proxy(&config)
			.await
			.context("Failed to build proxy")?,
	);

	let server = api::ApiServer::new(
		config.api.host.clone(),
		config.api.port,
		proxy,
		api::AdapterTypes::from_config(&config),
	);
	let server_handle = tokio::spawn(server.run());

	tokio::select! {
		result = server_handle => {
			result.context("API server task failed")??;
		}
		_ = setup_shutdown_signal() => {
			info!("Shutdown signal received, stopping");
		}
	}

	info!("Price oracle proxy stopped");
	Ok(())
}

async fn print_prices(config: ProxyConfig, assets: &[String]) -> Result<()> {
	let assets = assets
		.iter()
		.map(|asset| {
			asset
				.parse::<Address>()
				.with_context(|| format!("Invalid asset address: {}", asset))
		})
		.collect::<Result<Vec<_>>>()?;

	let proxy = bootstrap::build_proxy(&config)
		.await
		.context("Failed to build proxy")?;

	for asset in assets {
		let price = proxy.get_underlying_price(asset).await;
		println!("{} {} ({})", asset, price, format_ether(price));
	}

	Ok(())
}

fn validate_config(cli: &Cli, config: &ProxyConfig) -> Result<()> {
	info!("Configuration file {:?} is valid", cli.config);
	print!("{}", validation_report(cli, config));
	Ok(())
}

fn validation_report(cli: &Cli, config: &ProxyConfig) -> String {
	let guardian = config
		.proxy
		.guardian
		.map_or_else(|| "none".to_string(), |guardian| guardian.to_string());
	let api = if config.api.enabled {
		format!("{}:{}", config.api.host, config.api.port)
	} else {
		"disabled".to_string()
	};

	let mut report = format!("Configuration {} is valid\n", cli.config.display());
	for (name, value) in [
		("admin", config.proxy.admin.to_string()),
		("guardian", guardian),
		("native asset", config.proxy.native_asset.to_string()),
		("base symbol", config.proxy.base_symbol.clone()),
		("backing oracle", config.backing_oracle.adapter_type.clone()),
		("reference feed", config.reference_feed.adapter_type.clone()),
		("LP valuator", config.lp_valuator.adapter_type.clone()),
		("asset catalog", config.catalog.adapter_type.clone()),
		("symbols", config.symbols.len().to_string()),
		("LP assets", config.lp_assets.len().to_string()),
		("API", api),
	] {
		report.push_str(&format!("  {:<15} {}\n", format!("{}:", name), value));
	}
	report
}

/// Level from the configuration file, applied once it is loaded.
///
/// `RUST_LOG` and `--log-level` take precedence over the file.
fn file_log_level<'a>(cli: &Cli, config: &'a ProxyConfig, env_filter_set: bool) -> Option<&'a str> {
	(cli.log_level.is_none() && !env_filter_set).then_some(config.proxy.log_level.as_str())
}

fn setup_tracing(log_level: &str) -> Result<reload::Handle<EnvFilter, Registry>> {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
	let (env_filter, handle) = reload::Layer::new(env_filter);

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(handle)
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
