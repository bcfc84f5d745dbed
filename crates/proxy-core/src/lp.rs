//! Liquidity-pool token flags.

use crate::roles::{Role, RoleStore};
use proxy_types::{Address, ProxyError, Result};
use std::collections::HashMap;
use tracing::info;

/// Marks assets whose price comes from the LP valuator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LpFlagRegistry {
	flags: HashMap<Address, bool>,
}

impl LpFlagRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_lp(&self, asset: &Address) -> bool {
		self.flags.get(asset).copied().unwrap_or(false)
	}

	/// Writes a batch of flags. Admin only, all or nothing.
	pub fn set_lps(
		&mut self,
		roles: &RoleStore,
		caller: Address,
		assets: &[Address],
		flags: &[bool],
	) -> Result<()> {
		if !roles.authorize(caller, Role::Admin) {
			return Err(ProxyError::permission_denied(caller, "set LP flags"));
		}
		if assets.len() != flags.len() {
			return Err(ProxyError::MismatchedData {
				left: assets.len(),
				right: flags.len(),
			});
		}

		for (asset, flag) in assets.iter().zip(flags) {
			info!("LP flag for {} set to {}", asset, flag);
			self.flags.insert(*asset, *flag);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADMIN: Address = Address::repeat_byte(1);
	const POOL: Address = Address::repeat_byte(0xc);

	#[test]
	fn test_flags_default_to_false() {
		let registry = LpFlagRegistry::new();
		assert!(!registry.is_lp(&POOL));
	}

	#[test]
	fn test_set_lps() {
		let roles = RoleStore::new(ADMIN);
		let mut registry = LpFlagRegistry::new();

		registry.set_lps(&roles, ADMIN, &[POOL], &[true]).unwrap();
		assert!(registry.is_lp(&POOL));

		registry.set_lps(&roles, ADMIN, &[POOL], &[false]).unwrap();
		assert!(!registry.is_lp(&POOL));
	}

	#[test]
	fn test_set_lps_rejects() {
		let mut roles = RoleStore::new(ADMIN);
		let guardian = Address::repeat_byte(2);
		roles.set_guardian(ADMIN, Some(guardian)).unwrap();
		let mut registry = LpFlagRegistry::new();

		assert!(matches!(
			registry.set_lps(&roles, guardian, &[POOL], &[true]),
			Err(ProxyError::PermissionDenied { .. })
		));
		assert_eq!(
			registry.set_lps(&roles, ADMIN, &[POOL], &[true, false]),
			Err(ProxyError::MismatchedData { left: 1, right: 2 })
		);
		assert_eq!(registry, LpFlagRegistry::new());
	}
}
