//! Administrative roles.

use proxy_types::{Address, ProxyError, Result};
use std::fmt;
use tracing::info;

/// Role a caller must hold for a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Admin,
	Guardian,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Guardian => write!(f, "guardian"),
		}
	}
}

/// Admin and guardian identities.
///
/// The admin is always set. The guardian is optional and can only clear
/// symbol mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleStore {
	admin: Address,
	guardian: Option<Address>,
}

impl RoleStore {
	pub fn new(admin: Address) -> Self {
		Self {
			admin,
			guardian: None,
		}
	}

	pub fn admin(&self) -> Address {
		self.admin
	}

	pub fn guardian(&self) -> Option<Address> {
		self.guardian
	}

	/// Whether `caller` currently holds `role`.
	pub fn authorize(&self, caller: Address, role: Role) -> bool {
		match role {
			Role::Admin => caller == self.admin,
			Role::Guardian => self.guardian == Some(caller),
		}
	}

	/// Transfers the admin role. Only the current admin may call this.
	pub fn set_admin(&mut self, caller: Address, new_admin: Address) -> Result<()> {
		if !self.authorize(caller, Role::Admin) {
			return Err(ProxyError::permission_denied(caller, "set admin"));
		}

		info!("Admin changed from {} to {}", self.admin, new_admin);
		self.admin = new_admin;
		Ok(())
	}

	/// Replaces or clears the guardian. Only the admin may call this.
	pub fn set_guardian(&mut self, caller: Address, new_guardian: Option<Address>) -> Result<()> {
		if !self.authorize(caller, Role::Admin) {
			return Err(ProxyError::permission_denied(caller, "set guardian"));
		}

		match new_guardian {
			Some(guardian) => info!("Guardian set to {}", guardian),
			None => info!("Guardian cleared"),
		}
		self.guardian = new_guardian;
		Ok(())
	}
}
