/// Tag value that excludes a field from decoding.
pub const SKIP_TAG: &str = "-";

/// Parsed field serialization tag (`name,option,...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag<'a> {
	/// Key portion before the first comma; empty means "use the field name".
	pub key: &'a str,
	/// Whether `omitempty` was listed among the options.
	pub omit_empty: bool,
}

/// Dictionary lookup decision for one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
	/// Look the field up under this key.
	Key(&'a str),
	/// Never decode this field.
	Skip,
}

/// Split a raw tag into its key and options.
pub fn parse_tag(raw: &str) -> FieldTag<'_> {
	let mut parts = raw.split(',');
	let key = parts.next().unwrap_or_default();
	let omit_empty = parts.any(|option| option.trim() == "omitempty");
	FieldTag { key, omit_empty }
}

/// Resolve the dictionary key for a field declared as `name` with an optional `tag`.
///
/// An explicit tag key is used verbatim; otherwise the declared name is used without
/// any case transformation.
pub fn resolve_field<'a>(name: &'a str, tag: Option<&'a str>) -> FieldKey<'a> {
	let Some(raw) = tag else {
		return FieldKey::Key(name);
	};
	if raw == SKIP_TAG {
		return FieldKey::Skip;
	}

	let parsed = parse_tag(raw);
	if parsed.key.is_empty() {
		FieldKey::Key(name)
	} else {
		FieldKey::Key(parsed.key)
	}
}
