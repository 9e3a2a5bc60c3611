use std::fmt;

/// Error that can occur when building or mutating a [`Schema`](super::Schema)
/// in memory (not parsing JSON, see [`ReadSchemaError`](super::ReadSchemaError))
#[derive(Debug, thiserror::Error)]
#[error("{inner}")]
pub struct SchemaError {
	inner: Box<ErrorInner>,
}

#[derive(Debug, thiserror::Error)]
enum ErrorInner {
	#[error("Invalid name `{name}`: names must match [A-Za-z_][A-Za-z0-9_]* once split on '.'")]
	InvalidName { name: String },
	#[error("Invalid symbol `{symbol}`: enum symbols must match [A-Za-z_][A-Za-z0-9_]*")]
	InvalidSymbol { symbol: String },
	#[error("Duplicate name `{name}` in this schema")]
	DuplicateName { name: String },
	#[error("{0}")]
	Other(Box<dyn std::error::Error + Send + Sync>),
}

impl SchemaError {
	pub(crate) fn invalid_name(name: impl fmt::Display) -> Self {
		Self {
			inner: Box::new(ErrorInner::InvalidName {
				name: name.to_string(),
			}),
		}
	}

	pub(crate) fn invalid_symbol(symbol: impl fmt::Display) -> Self {
		Self {
			inner: Box::new(ErrorInner::InvalidSymbol {
				symbol: symbol.to_string(),
			}),
		}
	}

	pub(crate) fn duplicate_name(name: impl fmt::Display) -> Self {
		Self {
			inner: Box::new(ErrorInner::DuplicateName {
				name: name.to_string(),
			}),
		}
	}

	pub(crate) fn other(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self {
			inner: Box::new(ErrorInner::Other(e.into())),
		}
	}
}
