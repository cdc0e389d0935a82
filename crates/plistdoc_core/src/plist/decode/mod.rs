use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::ops::Deref;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::plist::path::KeyPath;
use crate::plist::{Format, Integer, PathStep, PlistError, Result, Shape, Uid, Value};

/// Facts about the document a value tree came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeContext {
	/// Source encoding, or `None` for trees built in memory.
	pub origin: Option<Format>,
}

impl DecodeContext {
	/// Context for a tree parsed from a document of `format`.
	pub fn from_format(format: Format) -> Self {
		Self { origin: Some(format) }
	}
}

/// Type that can be populated from a plist value tree.
pub trait Decode: Sized {
	/// Target shape, used for kind checks and error messages.
	fn shape() -> Shape;

	/// Decode `value` into `Self`.
	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self>;
}

/// Build the type-mismatch error for decoding `value` into `T`.
pub fn mismatch<T: Decode>(value: &Value) -> PlistError {
	PlistError::TypeMismatch {
		expected: T::shape(),
		found: value.kind(),
		path: KeyPath::root(),
	}
}

/// Decode an in-memory tree into `T`.
pub fn from_value<T: Decode>(value: &Value) -> Result<T> {
	T::decode(value, &DecodeContext::default())
}

/// Byte-blob decode target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(pub Vec<u8>);

impl Blob {
	/// Take the underlying bytes.
	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Deref for Blob {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl From<Vec<u8>> for Blob {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

impl Decode for Value {
	fn shape() -> Shape {
		Shape::Dynamic
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		Ok(value.clone())
	}
}

impl Decode for bool {
	fn shape() -> Shape {
		Shape::Boolean
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		match value {
			Value::Boolean(flag) => Ok(*flag),
			_ => Err(mismatch::<Self>(value)),
		}
	}
}

macro_rules! decode_integer {
	($($ty:ty),* $(,)?) => {$(
		impl Decode for $ty {
			fn shape() -> Shape {
				Shape::Integer { name: stringify!($ty) }
			}

			fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
				let Value::Integer(int) = value else {
					return Err(mismatch::<Self>(value));
				};
				int.narrow::<$ty>().ok_or_else(|| PlistError::IntegerOutOfRange {
					value: *int,
					target: stringify!($ty),
					path: KeyPath::root(),
				})
			}
		}
	)*};
}

decode_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Decode for Integer {
	fn shape() -> Shape {
		Shape::Integer { name: "Integer" }
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_integer().ok_or_else(|| mismatch::<Self>(value))
	}
}

impl Decode for f64 {
	fn shape() -> Shape {
		Shape::Real { name: "f64" }
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_real().ok_or_else(|| mismatch::<Self>(value))
	}
}

impl Decode for f32 {
	fn shape() -> Shape {
		Shape::Real { name: "f32" }
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_real().map(|real| real as f32).ok_or_else(|| mismatch::<Self>(value))
	}
}

impl Decode for String {
	fn shape() -> Shape {
		Shape::String
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_str().map(str::to_owned).ok_or_else(|| mismatch::<Self>(value))
	}
}

impl Decode for Blob {
	fn shape() -> Shape {
		Shape::Blob
	}

	/// XML-sourced data projects as the standard base64 text of its bytes; binary and
	/// in-memory data project as-is.
	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		let Value::Data(bytes) = value else {
			return Err(mismatch::<Self>(value));
		};
		match cx.origin {
			Some(Format::Xml) => Ok(Self(STANDARD.encode(bytes).into_bytes())),
			_ => Ok(Self(bytes.clone())),
		}
	}
}

impl Decode for DateTime<Utc> {
	fn shape() -> Shape {
		Shape::Timestamp
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_date().ok_or_else(|| mismatch::<Self>(value))
	}
}

impl Decode for Uid {
	fn shape() -> Shape {
		Shape::Uid
	}

	fn decode(value: &Value, _cx: &DecodeContext) -> Result<Self> {
		value.as_uid().ok_or_else(|| mismatch::<Self>(value))
	}
}

impl<T: Decode> Decode for Option<T> {
	fn shape() -> Shape {
		T::shape()
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		T::decode(value, cx).map(Some)
	}
}

impl<T: Decode> Decode for Box<T> {
	fn shape() -> Shape {
		T::shape()
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		T::decode(value, cx).map(Box::new)
	}
}

impl<T: Decode> Decode for Vec<T> {
	fn shape() -> Shape {
		Shape::Sequence
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		let Value::Array(items) = value else {
			return Err(mismatch::<Self>(value));
		};
		items
			.iter()
			.enumerate()
			.map(|(index, item)| {
				T::decode(item, cx).map_err(|err| err.within(PathStep::Index(index)))
			})
			.collect()
	}
}

/// Decode every dictionary entry through `V`, collecting into any map type.
fn decode_entries<V, M>(
	value: &Value,
	cx: &DecodeContext,
	expected: fn(&Value) -> PlistError,
) -> Result<M>
where
	V: Decode,
	M: FromIterator<(String, V)>,
{
	let Value::Dictionary(dict) = value else {
		return Err(expected(value));
	};
	dict.iter()
		.map(|(key, item)| {
			V::decode(item, cx)
				.map(|decoded| (key.clone(), decoded))
				.map_err(|err| err.within(PathStep::Key(key.clone())))
		})
		.collect()
}

impl<V: Decode, S: BuildHasher + Default> Decode for HashMap<String, V, S> {
	fn shape() -> Shape {
		Shape::Map
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		decode_entries::<V, Self>(value, cx, mismatch::<Self>)
	}
}

impl<V: Decode> Decode for BTreeMap<String, V> {
	fn shape() -> Shape {
		Shape::Map
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		decode_entries::<V, Self>(value, cx, mismatch::<Self>)
	}
}

impl<V: Decode, S: BuildHasher + Default> Decode for IndexMap<String, V, S> {
	fn shape() -> Shape {
		Shape::Map
	}

	fn decode(value: &Value, cx: &DecodeContext) -> Result<Self> {
		decode_entries::<V, Self>(value, cx, mismatch::<Self>)
	}
}
