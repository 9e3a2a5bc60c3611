use serde::de::value::{StrDeserializer, U32Deserializer};
use serde::de::{DeserializeSeed, Deserializer as _, EnumAccess, VariantAccess};

use super::super::error::DeError;
use super::Deserializer;

/// `EnumAccess`/`VariantAccess` for an Avro `enum` schema: a plain symbol
/// string, so only a unit variant is ever produced.
pub(crate) struct SymbolEnumAccess<'de> {
	symbol: &'de str,
}

impl<'de> SymbolEnumAccess<'de> {
	pub(crate) fn new(symbol: &'de str) -> Self {
		Self { symbol }
	}
}

impl<'de> EnumAccess<'de> for SymbolEnumAccess<'de> {
	type Error = DeError;
	type Variant = Self;

	fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self), DeError> {
		let value = seed.deserialize(StrDeserializer::new(self.symbol))?;
		Ok((value, self))
	}
}

impl<'de> VariantAccess<'de> for SymbolEnumAccess<'de> {
	type Error = DeError;

	fn unit_variant(self) -> Result<(), DeError> {
		Ok(())
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, _seed: T) -> Result<T::Value, DeError> {
		Err(DeError::invalid_encoding(0, "enum symbol has no payload for a newtype variant"))
	}

	fn tuple_variant<V: serde::de::Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, DeError> {
		Err(DeError::invalid_encoding(0, "enum symbol has no payload for a tuple variant"))
	}

	fn struct_variant<V: serde::de::Visitor<'de>>(
		self,
		_fields: &'static [&'static str],
		_visitor: V,
	) -> Result<V::Value, DeError> {
		Err(DeError::invalid_encoding(0, "enum symbol has no payload for a struct variant"))
	}
}

/// `EnumAccess`/`VariantAccess` for an Avro `union`: the variant is chosen
/// by its ordinal position among `schema.Union.variants` (the same
/// convention [`super::super::ser`] uses to serialize one), and its payload
/// — if any — is the already-unwrapped child [`Deserializer`].
pub(crate) struct UnionEnumAccess<'de, 's: 'de> {
	child: Deserializer<'de, 's>,
	index: usize,
	has_payload: bool,
}

impl<'de, 's: 'de> UnionEnumAccess<'de, 's> {
	pub(crate) fn new(child: Deserializer<'de, 's>, index: usize, payload: Option<&'de serde_json::Value>) -> Self {
		Self {
			child,
			index,
			has_payload: payload.is_some(),
		}
	}
}

impl<'de, 's: 'de> EnumAccess<'de> for UnionEnumAccess<'de, 's> {
	type Error = DeError;
	type Variant = Self;

	fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self), DeError> {
		let deserializer: U32Deserializer<DeError> = U32Deserializer::new(self.index as u32);
		let value = seed.deserialize(deserializer)?;
		Ok((value, self))
	}
}

impl<'de, 's: 'de> VariantAccess<'de> for UnionEnumAccess<'de, 's> {
	type Error = DeError;

	fn unit_variant(self) -> Result<(), DeError> {
		if self.has_payload {
			Err(DeError::invalid_encoding(0, "union member has a payload but host variant expects none"))
		} else {
			Ok(())
		}
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, DeError> {
		seed.deserialize(self.child)
	}

	fn tuple_variant<V: serde::de::Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, DeError> {
		self.child.deserialize_tuple(len, visitor)
	}

	fn struct_variant<V: serde::de::Visitor<'de>>(
		self,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DeError> {
		self.child.deserialize_struct("", fields, visitor)
	}
}
