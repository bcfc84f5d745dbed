//! Error types for the proxy.

use crate::common::Address;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors returned by mutating operations.
///
/// Reads never fail; an unresolvable price is reported as `0`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
	/// The caller lacks the role the attempted mutation requires.
	#[error("Permission denied: {caller} may not {action}")]
	PermissionDenied { caller: Address, action: String },

	/// Two parallel input sequences differ in length.
	#[error("Mismatched data: {left} entries against {right}")]
	MismatchedData { left: usize, right: usize },
}

impl ProxyError {
	pub fn permission_denied(caller: Address, action: impl Into<String>) -> Self {
		Self::PermissionDenied {
			caller,
			action: action.into(),
		}
	}
}

/// Errors raised by collaborator adapters.
///
/// The resolver treats every one of these as "no data".
#[derive(Error, Debug)]
pub enum FeedError {
	#[error("Call failed: {0}")]
	Call(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Decode error: {0}")]
	Decode(String),
}
