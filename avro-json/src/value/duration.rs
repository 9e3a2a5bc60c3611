//! Host-side representation for the Avro `duration` logical type (§4.8): a
//! 12-byte value of three little-endian `u32` components (months, days,
//! milliseconds).
//!
//! This is the "dedicated struct" representation the teacher crate
//! documents as the recommended way to carry a Duration value, since a
//! general-purpose time-span type cannot represent a nonzero month count
//! exactly.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
	pub months: u32,
	pub days: u32,
	pub millis: u32,
}

impl Duration {
	pub fn new(months: u32, days: u32, millis: u32) -> Self {
		Self { months, days, millis }
	}
}

impl Serialize for Duration {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut tup = serializer.serialize_tuple(3)?;
		tup.serialize_element(&self.months)?;
		tup.serialize_element(&self.days)?;
		tup.serialize_element(&self.millis)?;
		tup.end()
	}
}

impl<'de> Deserialize<'de> for Duration {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct DurationVisitor;
		impl<'de> Visitor<'de> for DurationVisitor {
			type Value = Duration;

			fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str("a (months, days, milliseconds) tuple")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Duration, A::Error> {
				let months = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
				let days = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
				let millis = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(2, &self))?;
				Ok(Duration { months, days, millis })
			}
		}
		deserializer.deserialize_tuple(3, DurationVisitor)
	}
}

/// A lossy time-span view of an Avro `duration`: its `days` and `millis`
/// components only, with no room for `months`.
///
/// Deserializing into this type is only lossless when the source value's
/// `months` component is zero — a calendar month has no fixed length, so it
/// cannot be folded into a fixed-length span. A nonzero `months` component
/// is rejected at deserialize time rather than silently truncated; decode
/// into [`Duration`] instead if `months` must be preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpan {
	pub days: u32,
	pub millis: u32,
}

impl TimeSpan {
	pub fn new(days: u32, millis: u32) -> Self {
		Self { days, millis }
	}
}

impl<'de> Deserialize<'de> for TimeSpan {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct TimeSpanVisitor;
		impl<'de> Visitor<'de> for TimeSpanVisitor {
			type Value = TimeSpan;

			fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str("a (days, milliseconds) tuple")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TimeSpan, A::Error> {
				let days = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
				let millis = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
				Ok(TimeSpan { days, millis })
			}
		}
		deserializer.deserialize_tuple(2, TimeSpanVisitor)
	}
}
