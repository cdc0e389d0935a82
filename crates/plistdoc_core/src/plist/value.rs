use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const ABSOLUTE_TIME_EPOCH_UNIX: i64 = 978_307_200;

/// String-keyed dictionary preserving insertion order.
pub type Dictionary = IndexMap<String, Value>;

/// Decoded plist node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Unicode string.
	String(String),
	/// Integer scalar.
	Integer(Integer),
	/// Double-precision real; single-precision sources are widened on read.
	Real(f64),
	/// Boolean scalar.
	Boolean(bool),
	/// Absolute instant.
	Date(DateTime<Utc>),
	/// Opaque byte payload.
	Data(Vec<u8>),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// String-keyed mapping.
	Dictionary(Dictionary),
	/// Keyed-archiver object reference (binary only).
	Uid(Uid),
}

/// Plist integer.
///
/// Most integers are signed 64-bit. The unsigned class carries magnitudes that only a
/// 128-bit source encoding (or an oversized XML literal) can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integer {
	/// Signed 64-bit value.
	Signed(i64),
	/// Unsigned 128-bit magnitude.
	Unsigned(u128),
}

impl Integer {
	/// Convert into any integer type that can represent this value.
	pub fn narrow<T>(self) -> Option<T>
	where
		T: TryFrom<i64> + TryFrom<u128>,
	{
		match self {
			Self::Signed(value) => <T as TryFrom<i64>>::try_from(value).ok(),
			Self::Unsigned(value) => <T as TryFrom<u128>>::try_from(value).ok(),
		}
	}

	/// Value as `i64` when it fits.
	pub fn as_i64(self) -> Option<i64> {
		self.narrow()
	}

	/// Value as `u64` when it is non-negative and fits.
	pub fn as_u64(self) -> Option<u64> {
		self.narrow()
	}

	/// Value as `i128` when it fits.
	pub fn as_i128(self) -> Option<i128> {
		self.narrow()
	}
}

impl From<i64> for Integer {
	fn from(value: i64) -> Self {
		Self::Signed(value)
	}
}

impl From<i32> for Integer {
	fn from(value: i32) -> Self {
		Self::Signed(i64::from(value))
	}
}

impl From<u32> for Integer {
	fn from(value: u32) -> Self {
		Self::Signed(i64::from(value))
	}
}

impl From<u64> for Integer {
	fn from(value: u64) -> Self {
		match i64::try_from(value) {
			Ok(signed) => Self::Signed(signed),
			Err(_) => Self::Unsigned(u128::from(value)),
		}
	}
}

impl fmt::Display for Integer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Signed(value) => write!(f, "{value}"),
			Self::Unsigned(value) => write!(f, "{value}"),
		}
	}
}

/// Keyed-archiver object reference, kept opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u64);

impl Uid {
	/// Raw reference value.
	pub fn get(self) -> u64 {
		self.0
	}
}

/// Value variant tag used for branching and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// [`Value::String`].
	String,
	/// [`Value::Integer`].
	Integer,
	/// [`Value::Real`].
	Real,
	/// [`Value::Boolean`].
	Boolean,
	/// [`Value::Date`].
	Date,
	/// [`Value::Data`].
	Data,
	/// [`Value::Array`].
	Array,
	/// [`Value::Dictionary`].
	Dictionary,
	/// [`Value::Uid`].
	Uid,
}

impl Kind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::Boolean => "boolean",
			Self::Date => "date",
			Self::Data => "data",
			Self::Array => "array",
			Self::Dictionary => "dictionary",
			Self::Uid => "uid",
		}
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Value {
	/// Variant tag of this value.
	pub fn kind(&self) -> Kind {
		match self {
			Self::String(_) => Kind::String,
			Self::Integer(_) => Kind::Integer,
			Self::Real(_) => Kind::Real,
			Self::Boolean(_) => Kind::Boolean,
			Self::Date(_) => Kind::Date,
			Self::Data(_) => Kind::Data,
			Self::Array(_) => Kind::Array,
			Self::Dictionary(_) => Kind::Dictionary,
			Self::Uid(_) => Kind::Uid,
		}
	}

	/// String contents, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Integer value, if this is an integer.
	pub fn as_integer(&self) -> Option<Integer> {
		match self {
			Self::Integer(value) => Some(*value),
			_ => None,
		}
	}

	/// Real value, if this is a real.
	pub fn as_real(&self) -> Option<f64> {
		match self {
			Self::Real(value) => Some(*value),
			_ => None,
		}
	}

	/// Boolean value, if this is a boolean.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Boolean(value) => Some(*value),
			_ => None,
		}
	}

	/// Instant, if this is a date.
	pub fn as_date(&self) -> Option<DateTime<Utc>> {
		match self {
			Self::Date(value) => Some(*value),
			_ => None,
		}
	}

	/// Bytes, if this is data.
	pub fn as_data(&self) -> Option<&[u8]> {
		match self {
			Self::Data(value) => Some(value),
			_ => None,
		}
	}

	/// Elements, if this is an array.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(value) => Some(value),
			_ => None,
		}
	}

	/// Entries, if this is a dictionary.
	pub fn as_dictionary(&self) -> Option<&Dictionary> {
		match self {
			Self::Dictionary(value) => Some(value),
			_ => None,
		}
	}

	/// Reference, if this is a UID.
	pub fn as_uid(&self) -> Option<Uid> {
		match self {
			Self::Uid(value) => Some(*value),
			_ => None,
		}
	}

	/// Look up a dictionary entry; `None` for missing keys and non-dictionaries.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_dictionary()?.get(key)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Integer(Integer::from(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::Integer(Integer::from(value))
	}
}

impl From<Integer> for Value {
	fn from(value: Integer) -> Self {
		Self::Integer(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Real(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Date(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Self::Data(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Array(value)
	}
}

impl From<Dictionary> for Value {
	fn from(value: Dictionary) -> Self {
		Self::Dictionary(value)
	}
}

impl From<Uid> for Value {
	fn from(value: Uid) -> Self {
		Self::Uid(value)
	}
}

/// Convert seconds since 2001-01-01T00:00:00Z into an instant.
///
/// Returns `None` for non-finite or unrepresentable inputs.
pub fn date_from_absolute_time(secs: f64) -> Option<DateTime<Utc>> {
	if !secs.is_finite() {
		return None;
	}

	let mut whole = secs.floor();
	let mut nanos = ((secs - whole) * 1e9).round();
	if nanos >= 1e9 {
		whole += 1.0;
		nanos = 0.0;
	}
	if whole.abs() > 1e15 {
		return None;
	}

	let unix = (whole as i64).checked_add(ABSOLUTE_TIME_EPOCH_UNIX)?;
	DateTime::from_timestamp(unix, nanos as u32)
}

/// Convert an instant into seconds since 2001-01-01T00:00:00Z.
pub fn absolute_time_from_date(date: &DateTime<Utc>) -> f64 {
	let whole = (date.timestamp() - ABSOLUTE_TIME_EPOCH_UNIX) as f64;
	whole + f64::from(date.timestamp_subsec_nanos()) / 1e9
}

impl Serialize for Integer {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Signed(value) => serializer.serialize_i64(*value),
			Self::Unsigned(value) => serializer.serialize_u128(*value),
		}
	}
}

impl Serialize for Uid {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		map.serialize_entry("CF$UID", &self.0)?;
		map.end()
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::String(value) => serializer.serialize_str(value),
			Self::Integer(value) => value.serialize(serializer),
			Self::Real(value) => serializer.serialize_f64(*value),
			Self::Boolean(value) => serializer.serialize_bool(*value),
			Self::Date(value) => serializer.serialize_str(&value.to_rfc3339()),
			Self::Data(value) => serializer.serialize_bytes(value),
			Self::Array(items) => serializer.collect_seq(items),
			Self::Dictionary(dict) => serializer.collect_map(dict),
			Self::Uid(value) => value.serialize(serializer),
		}
	}
}
