mod binary;
mod bytes;
mod decode;
mod error;
mod marker;
mod path;
mod record;
mod shape;
mod sniff;
mod stream;
mod tag;
mod trailer;
mod value;
mod writer;
mod xml;

/// Binary plist reader, options, and whole-buffer helpers.
pub use binary::{
	BinaryReader, ReadOptions, from_bytes as from_binary_bytes,
	from_bytes_with as from_binary_bytes_with,
};
/// Type-directed decoding trait, context, and targets.
pub use decode::{Blob, Decode, DecodeContext, from_value, mismatch};
/// Error, category, and result aliases.
pub use error::{ErrorCategory, PlistError, Result};
/// Key paths used in decode errors and tree lookups.
pub use path::{KeyPath, PathStep};
/// Record field tables and the record decoder.
pub use record::{Field, FieldDecodeFn, Record, decode_record};
/// Target shape descriptors.
pub use shape::Shape;
/// Format detection.
pub use sniff::{Format, sniff};
/// Whole-buffer and sequential decode entry points.
pub use stream::{Decoder, from_bytes, parse_value, parse_value_with};
/// Field tag resolution.
pub use tag::{FieldKey, FieldTag, SKIP_TAG, parse_tag, resolve_field};
/// Binary trailer layout.
pub use trailer::{BINARY_MAGIC, Trailer};
/// Value model types and absolute-time conversions.
pub use value::{
	ABSOLUTE_TIME_EPOCH_UNIX, Dictionary, Integer, Kind, Uid, Value, absolute_time_from_date,
	date_from_absolute_time,
};
/// Binary encoder.
pub use writer::{to_bytes as to_binary_bytes, write_binary};
/// XML document parser.
pub use xml::{from_xml_bytes, from_xml_bytes_with};
