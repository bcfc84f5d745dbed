//! Core of the price oracle proxy.
//!
//! Holds the role-gated configuration state (roles, underlying symbols and
//! liquidity-pool flags) and the resolver that turns an asset into a single
//! 18-decimal price by walking an ordered chain of price sources.

pub mod lp;
pub mod proxy;
pub mod resolver;
pub mod roles;
pub mod state;
pub mod symbols;

pub use lp::LpFlagRegistry;
pub use proxy::{PriceOracleProxy, ProxyBuilder, DEFAULT_BASE_SYMBOL};
pub use resolver::{PriceQuery, PriceResolver, PriceSource};
pub use roles::{Role, RoleStore};
pub use state::ProxyState;
pub use symbols::SymbolRegistry;
