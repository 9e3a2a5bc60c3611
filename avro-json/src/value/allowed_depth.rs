//! Recursion guard shared by the serializer and deserializer.
//!
//! §9 "Cyclic record graphs": recursion through a self-/mutually-recursive
//! [`Record`](crate::schema::Record) is handled by ordinary recursive Rust
//! calls rather than an explicit reference/back-patch table; this counter is
//! what turns an unconditionally-cyclic instance into a controlled error
//! instead of a stack overflow (§8: "the codec builder terminates ... raise
//! a controlled error on actual cycles").

/// Remaining permitted nesting depth for a single serialize/deserialize call.
#[derive(Debug, Clone, Copy)]
pub struct AllowedDepth(u16);

impl AllowedDepth {
	/// Matches the teacher's own default recursion budget.
	pub const DEFAULT_MAX: u16 = 128;

	pub fn new(max: u16) -> Self {
		Self(max)
	}

	/// Consume one level of depth budget, failing once it's exhausted.
	pub fn dec(self) -> Result<Self, DepthExceeded> {
		self.0.checked_sub(1).map(Self).ok_or(DepthExceeded)
	}
}

impl Default for AllowedDepth {
	fn default() -> Self {
		Self(Self::DEFAULT_MAX)
	}
}

/// Raised when a schema/value pair recurses deeper than [`AllowedDepth`]
/// allows, almost always because of an unconditionally cyclic record.
#[derive(Debug)]
pub struct DepthExceeded;

impl std::fmt::Display for DepthExceeded {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("recursion limit exceeded (likely an unconditionally cyclic record)")
	}
}

impl std::error::Error for DepthExceeded {}
