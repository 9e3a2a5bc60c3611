//! Named-schema identity: full names, namespace qualification, validation

use super::SchemaError;

/// Schema component holding both the "name" and the "namespace" of a named
/// schema (record, enum or fixed)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified_name, f)
	}
}

impl std::fmt::Display for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.fully_qualified_name)
	}
}

impl Name {
	/// The rightmost component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `c`
	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			None => &self.fully_qualified_name,
			Some(idx) => &self.fully_qualified_name[idx + 1..],
		}
	}

	/// The namespace component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `a.b`
	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx
			.map(|idx| &self.fully_qualified_name[..idx])
	}

	/// The fully qualified name, e.g. `a.b.c`
	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}

	/// Build a [`Name`] from a fully qualified name, validating both the
	/// simple name and every namespace component against the identifier
	/// rule (§4.1: `[A-Za-z_][A-Za-z0-9_]*`)
	pub fn from_fully_qualified_name(
		fully_qualified_name: impl Into<String>,
	) -> Result<Self, SchemaError> {
		let fully_qualified_name = fully_qualified_name.into();
		validate_full_name(&fully_qualified_name)?;
		let namespace_delimiter_idx = fully_qualified_name.rfind('.');
		Ok(Self {
			namespace_delimiter_idx,
			fully_qualified_name,
		})
	}

	/// Build a [`Name`] from separate simple-name and namespace components.
	///
	/// An empty or absent namespace means "no namespace".
	pub fn new(name: &str, namespace: Option<&str>) -> Result<Self, SchemaError> {
		validate_simple_name(name)?;
		match namespace.filter(|ns| !ns.is_empty()) {
			None => Ok(Self {
				fully_qualified_name: name.to_owned(),
				namespace_delimiter_idx: None,
			}),
			Some(namespace) => {
				validate_namespace(namespace)?;
				let mut fully_qualified_name = String::with_capacity(namespace.len() + 1 + name.len());
				fully_qualified_name.push_str(namespace);
				fully_qualified_name.push('.');
				let namespace_delimiter_idx = Some(fully_qualified_name.len() - 1);
				fully_qualified_name.push_str(name);
				Ok(Self {
					fully_qualified_name,
					namespace_delimiter_idx,
				})
			}
		}
	}

	/// Replace the simple name, keeping the namespace unchanged
	pub fn set_name(&mut self, name: &str) -> Result<(), SchemaError> {
		validate_simple_name(name)?;
		let namespace = self.namespace().map(str::to_owned);
		*self = Self::new(name, namespace.as_deref())?;
		Ok(())
	}

	/// Replace the namespace, keeping the simple name unchanged
	pub fn set_namespace(&mut self, namespace: Option<&str>) -> Result<(), SchemaError> {
		let name = self.name().to_owned();
		*self = Self::new(&name, namespace)?;
		Ok(())
	}
}

/// Is `s` a valid simple identifier (`[A-Za-z_][A-Za-z0-9_]*`)?
fn is_simple_identifier(s: &str) -> bool {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_simple_name(name: &str) -> Result<(), SchemaError> {
	validate_simple_identifier(name)
}

/// Public (crate-internal) identifier check shared by record field names and
/// enum symbols, which obey the same simple-identifier rule as a bare name
/// (§3 "RecordField", "Invariants: Enum symbols").
pub(crate) fn validate_simple_identifier(name: &str) -> Result<(), SchemaError> {
	if is_simple_identifier(name) {
		Ok(())
	} else {
		Err(SchemaError::invalid_name(name))
	}
}

/// Every dot-separated component of `namespace` must be a simple identifier
fn validate_namespace(namespace: &str) -> Result<(), SchemaError> {
	if namespace.split('.').all(is_simple_identifier) {
		Ok(())
	} else {
		Err(SchemaError::invalid_name(namespace))
	}
}

/// Split on `.`; the last component must be a simple identifier, every prior
/// component (if any) must also be a simple identifier. An empty string is
/// rejected by `is_simple_identifier` on the (only, empty) component.
fn validate_full_name(full_name: &str) -> Result<(), SchemaError> {
	if full_name.split('.').all(is_simple_identifier) {
		Ok(())
	} else {
		Err(SchemaError::invalid_name(full_name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn simple_name_no_namespace() {
		let n = Name::from_fully_qualified_name("Foo").unwrap();
		assert_eq!(n.name(), "Foo");
		assert_eq!(n.namespace(), None);
		assert_eq!(n.fully_qualified_name(), "Foo");
	}

	#[test]
	fn qualified_name() {
		let n = Name::from_fully_qualified_name("a.b.Foo").unwrap();
		assert_eq!(n.name(), "Foo");
		assert_eq!(n.namespace(), Some("a.b"));
	}

	#[test]
	fn rejects_invalid_identifiers() {
		assert!(Name::from_fully_qualified_name("1Foo").is_err());
		assert!(Name::from_fully_qualified_name("a.1b.Foo").is_err());
		assert!(Name::from_fully_qualified_name("a..Foo").is_err());
		assert!(Name::from_fully_qualified_name("a.b-c.Foo").is_err());
	}

	#[test]
	fn set_name_preserves_namespace() {
		let mut n = Name::from_fully_qualified_name("a.b.Foo").unwrap();
		n.set_name("Bar").unwrap();
		assert_eq!(n.fully_qualified_name(), "a.b.Bar");
	}

	#[test]
	fn set_namespace_preserves_name() {
		let mut n = Name::from_fully_qualified_name("Foo").unwrap();
		n.set_namespace(Some("x.y")).unwrap();
		assert_eq!(n.fully_qualified_name(), "x.y.Foo");
		n.set_namespace(None).unwrap();
		assert_eq!(n.fully_qualified_name(), "Foo");
	}
}
