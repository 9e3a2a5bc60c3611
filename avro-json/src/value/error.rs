use std::fmt;

use super::allowed_depth::DepthExceeded;

/// Family 3 (build-time) from §7: raised only while matching a host type
/// against a schema shape, never by a runtime codec invocation.
#[derive(Debug, thiserror::Error)]
#[error("unsupported type: {message}")]
pub struct BuildError {
	message: String,
}

impl BuildError {
	pub fn unsupported_type(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Family 4 (runtime) serialization errors (§7).
#[derive(Debug, thiserror::Error)]
pub enum SerError {
	#[error("unsupported type: {message}")]
	UnsupportedType { message: String },
	#[error("overflow: {message}")]
	Overflow { message: String },
	#[error("recursion limit exceeded")]
	RecursionLimitExceeded,
	#[error("{0}")]
	Custom(Box<str>),
}

impl SerError {
	pub(crate) fn unsupported_type(message: impl Into<String>) -> Self {
		Self::UnsupportedType { message: message.into() }
	}
}

impl From<DepthExceeded> for SerError {
	fn from(_: DepthExceeded) -> Self {
		Self::RecursionLimitExceeded
	}
}

impl serde::ser::Error for SerError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string().into_boxed_str())
	}
}

/// Family 4 (runtime) deserialization errors (§7). `position` is the
/// zero-based index (byte offset, array index or similar token-start marker)
/// at which the reader aborted, where one is meaningfully available.
#[derive(Debug, thiserror::Error)]
pub enum DeError {
	#[error("invalid encoding at position {position}: {message}")]
	InvalidEncoding { position: usize, message: String },
	#[error("overflow: {message}")]
	Overflow { message: String },
	#[error("recursion limit exceeded")]
	RecursionLimitExceeded,
	#[error("{0}")]
	Custom(Box<str>),
}

impl DeError {
	pub(crate) fn invalid_encoding(position: usize, message: impl Into<String>) -> Self {
		Self::InvalidEncoding {
			position,
			message: message.into(),
		}
	}

	/// Duration deserialization with non-zero months (§4.8, §9): the source
	/// library's documented, formalized overflow case.
	pub(crate) fn duration_months_overflow() -> Self {
		Self::Overflow {
			message: "durations containing months cannot be accurately deserialized into a fixed-length time span"
				.to_owned(),
		}
	}
}

impl From<DepthExceeded> for DeError {
	fn from(_: DepthExceeded) -> Self {
		Self::RecursionLimitExceeded
	}
}

impl serde::de::Error for DeError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		Self::Custom(msg.to_string().into_boxed_str())
	}
}
