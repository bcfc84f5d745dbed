//! Underlying-token to reference-feed symbol mapping.

use crate::roles::{Role, RoleStore};
use proxy_types::{Address, ProxyError, Result};
use std::collections::HashMap;
use tracing::info;

/// Maps an underlying token to the symbol it is quoted under on the
/// reference feed. An empty string, or no entry at all, means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolRegistry {
	entries: HashMap<Address, String>,
}

impl SymbolRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Symbol configured for `token`, empty when unset.
	pub fn symbol_of(&self, token: &Address) -> &str {
		self.entries.get(token).map(String::as_str).unwrap_or("")
	}

	/// Writes a batch of symbols.
	///
	/// The admin may write anything. The guardian may only clear entries:
	/// every symbol it submits must be empty. Nothing is written unless the
	/// whole batch validates. Returns the number of entries written.
	pub fn set_symbols(
		&mut self,
		roles: &RoleStore,
		caller: Address,
		tokens: &[Address],
		symbols: &[String],
	) -> Result<usize> {
		let pending = self.plan(roles, caller, tokens, symbols)?;
		let written = pending.len();

		for (token, symbol) in pending {
			info!("Underlying symbol for {} set to {:?}", token, symbol);
			self.entries.insert(token, symbol);
		}

		Ok(written)
	}

	fn plan(
		&self,
		roles: &RoleStore,
		caller: Address,
		tokens: &[Address],
		symbols: &[String],
	) -> Result<Vec<(Address, String)>> {
		if tokens.len() != symbols.len() {
			return Err(ProxyError::MismatchedData {
				left: tokens.len(),
				right: symbols.len(),
			});
		}

		let pairs = tokens.iter().copied().zip(symbols.iter().cloned());

		if roles.authorize(caller, Role::Admin) {
			return Ok(pairs.collect());
		}

		if !roles.authorize(caller, Role::Guardian) {
			return Err(ProxyError::permission_denied(caller, "set symbols"));
		}

		let mut pending = Vec::new();
		for (token, symbol) in pairs {
			if !symbol.is_empty() {
				return Err(ProxyError::permission_denied(
					caller,
					format!("set symbol {:?} for {}", symbol, token),
				));
			}
			// Clearing an already empty entry is a no-op
			if !self.symbol_of(&token).is_empty() {
				pending.push((token, symbol));
			}
		}

		Ok(pending)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADMIN: Address = Address::repeat_byte(1);
	const GUARDIAN: Address = Address::repeat_byte(2);
	const STRANGER: Address = Address::repeat_byte(3);
	const TOKEN_A: Address = Address::repeat_byte(0xa);
	const TOKEN_B: Address = Address::repeat_byte(0xb);

	fn roles() -> RoleStore {
		let mut roles = RoleStore::new(ADMIN);
		roles.set_guardian(ADMIN, Some(GUARDIAN)).unwrap();
		roles
	}

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_absent_entry_is_empty() {
		let registry = SymbolRegistry::new();
		assert_eq!(registry.symbol_of(&TOKEN_A), "");
	}

	#[test]
	fn test_admin_overwrites() {
		let roles = roles();
		let mut registry = SymbolRegistry::new();

		registry
			.set_symbols(&roles, ADMIN, &[TOKEN_A, TOKEN_B], &strings(&["ETH", "BTC"]))
			.unwrap();
		assert_eq!(registry.symbol_of(&TOKEN_A), "ETH");
		assert_eq!(registry.symbol_of(&TOKEN_B), "BTC");

		registry
			.set_symbols(&roles, ADMIN, &[TOKEN_A, TOKEN_B], &strings(&["WETH", ""]))
			.unwrap();
		assert_eq!(registry.symbol_of(&TOKEN_A), "WETH");
		assert_eq!(registry.symbol_of(&TOKEN_B), "");
	}

	#[test]
	fn test_mismatched_lengths_touch_nothing() {
		let roles = roles();
		let mut registry = SymbolRegistry::new();
		registry
			.set_symbols(&roles, ADMIN, &[TOKEN_A], &strings(&["ETH"]))
			.unwrap();
		let before = registry.clone();

		let result = registry.set_symbols(&roles, ADMIN, &[TOKEN_A, TOKEN_B], &strings(&["BTC"]));
		assert_eq!(result, Err(ProxyError::MismatchedData { left: 2, right: 1 }));
		assert_eq!(registry, before);
	}

	#[test]
	fn test_guardian_can_only_clear() {
		let roles = roles();
		let mut registry = SymbolRegistry::new();
		registry
			.set_symbols(&roles, ADMIN, &[TOKEN_A], &strings(&["ETH"]))
			.unwrap();

		// Overwriting a set entry with another value is rejected
		let result = registry.set_symbols(&roles, GUARDIAN, &[TOKEN_A], &strings(&["BTC"]));
		assert!(matches!(result, Err(ProxyError::PermissionDenied { .. })));
		assert_eq!(registry.symbol_of(&TOKEN_A), "ETH");

		// Setting an empty entry is rejected
		let result = registry.set_symbols(&roles, GUARDIAN, &[TOKEN_B], &strings(&["BTC"]));
		assert!(matches!(result, Err(ProxyError::PermissionDenied { .. })));
		assert_eq!(registry.symbol_of(&TOKEN_B), "");

		// Clearing is allowed, clearing an empty entry is a no-op
		let written = registry
			.set_symbols(&roles, GUARDIAN, &[TOKEN_A, TOKEN_B], &strings(&["", ""]))
			.unwrap();
		assert_eq!(written, 1);
		assert_eq!(registry.symbol_of(&TOKEN_A), "");
	}

	#[test]
	fn test_guardian_batch_is_all_or_nothing() {
		let roles = roles();
		let mut registry = SymbolRegistry::new();
		registry
			.set_symbols(&roles, ADMIN, &[TOKEN_A, TOKEN_B], &strings(&["ETH", "BTC"]))
			.unwrap();
		let before = registry.clone();

		// The first pair is a valid clear, the second is forbidden
		let result = registry.set_symbols(&roles, GUARDIAN, &[TOKEN_A, TOKEN_B], &strings(&["", "DOGE"]));
		assert!(matches!(result, Err(ProxyError::PermissionDenied { .. })));
		assert_eq!(registry, before);
	}

	#[test]
	fn test_stranger_is_denied() {
		let roles = roles();
		let mut registry = SymbolRegistry::new();

		let result = registry.set_symbols(&roles, STRANGER, &[TOKEN_A], &strings(&[""]));
		assert_eq!(
			result,
			Err(ProxyError::permission_denied(STRANGER, "set symbols"))
		);
	}
}
