use crate::plist::tag::{FieldKey, resolve_field};
use crate::plist::{DecodeContext, PathStep, PlistError, Result, Shape, Value};

/// Setter that decodes one dictionary value into a record field.
pub type FieldDecodeFn<R> = fn(&mut R, &Value, &DecodeContext) -> Result<()>;

/// Static description of one record field.
pub struct Field<R> {
	/// Declared field name.
	pub name: &'static str,
	/// Optional serialization tag (`key`, `key,omitempty`, or `-`).
	pub tag: Option<&'static str>,
	/// Field decoder.
	pub decode: FieldDecodeFn<R>,
}

impl<R> Field<R> {
	/// Dictionary key this field reads, or [`FieldKey::Skip`].
	pub fn key(&self) -> FieldKey<'static> {
		resolve_field(self.name, self.tag)
	}
}

/// Record type with a statically declared field table.
///
/// Usually implemented through [`plist_record!`](crate::plist_record).
pub trait Record: Default + Sized + 'static {
	/// Record type name used in error messages.
	const NAME: &'static str;

	/// Field table, in declaration order.
	fn fields() -> &'static [Field<Self>];
}

/// Decode a dictionary into a record.
///
/// Missing keys leave the field at its default value; keys without a matching field are
/// ignored.
pub fn decode_record<R: Record>(value: &Value, cx: &DecodeContext) -> Result<R> {
	let Value::Dictionary(dict) = value else {
		return Err(PlistError::TypeMismatch {
			expected: Shape::Record { name: R::NAME },
			found: value.kind(),
			path: Default::default(),
		});
	};

	let mut record = R::default();
	for field in R::fields() {
		let FieldKey::Key(key) = field.key() else {
			continue;
		};
		let Some(item) = dict.get(key) else {
			continue;
		};
		(field.decode)(&mut record, item, cx)
			.map_err(|err| err.within(PathStep::Key(key.to_owned())))?;
	}
	Ok(record)
}

/// Declare the plist field table of a struct and implement
/// [`Decode`](crate::plist::Decode) for it.
///
/// Each field is listed by name, optionally followed by `=> "tag"`. The struct must
/// implement `Default`; fields whose keys are missing keep their default value.
///
/// ```
/// use plistdoc::plist_record;
///
/// #[derive(Debug, Default)]
/// struct Header {
/// 	version: String,
/// 	band_size: u64,
/// 	scratch: u8,
/// }
///
/// plist_record!(Header {
/// 	version => "CFBundleInfoDictionaryVersion",
/// 	band_size => "band-size",
/// 	scratch => "-",
/// });
/// ```
#[macro_export]
macro_rules! plist_record {
	($ty:ident { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
		impl $crate::plist::Record for $ty {
			const NAME: &'static str = stringify!($ty);

			fn fields() -> &'static [$crate::plist::Field<Self>] {
				const FIELDS: &[$crate::plist::Field<$ty>] = &[$(
					$crate::plist::Field {
						name: stringify!($field),
						tag: $crate::__plist_tag!($($tag)?),
						decode: |record, value, cx| {
							record.$field = $crate::plist::Decode::decode(value, cx)?;
							Ok(())
						},
					}
				),*];
				FIELDS
			}
		}

		impl $crate::plist::Decode for $ty {
			fn shape() -> $crate::plist::Shape {
				$crate::plist::Shape::Record { name: stringify!($ty) }
			}

			fn decode(
				value: &$crate::plist::Value,
				cx: &$crate::plist::DecodeContext,
			) -> $crate::plist::Result<Self> {
				$crate::plist::decode_record(value, cx)
			}
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __plist_tag {
	() => {
		None
	};
	($tag:literal) => {
		Some($tag)
	};
}
