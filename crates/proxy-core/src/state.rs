//! Committed configuration state.

use crate::{lp::LpFlagRegistry, roles::RoleStore, symbols::SymbolRegistry};
use proxy_types::Address;

/// Roles and registries, published as one immutable snapshot.
///
/// Writers mutate a clone and replace the published snapshot, so a reader
/// never sees a partially applied batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyState {
	pub roles: RoleStore,
	pub symbols: SymbolRegistry,
	pub lp_flags: LpFlagRegistry,
}

impl ProxyState {
	pub fn new(admin: Address) -> Self {
		Self {
			roles: RoleStore::new(admin),
			symbols: SymbolRegistry::new(),
			lp_flags: LpFlagRegistry::new(),
		}
	}
}
