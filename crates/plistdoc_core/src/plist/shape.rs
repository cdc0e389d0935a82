use std::fmt;

/// Description of a decode target, reported in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
	/// Any value, exposed as-is.
	Dynamic,
	/// `bool`.
	Boolean,
	/// Integer type of the given name (`u64`, `i32`, ...).
	Integer {
		/// Rust type name.
		name: &'static str,
	},
	/// Floating-point type of the given name.
	Real {
		/// Rust type name.
		name: &'static str,
	},
	/// Text.
	String,
	/// Byte blob.
	Blob,
	/// Instant.
	Timestamp,
	/// Keyed-archiver reference.
	Uid,
	/// Ordered list of one element shape.
	Sequence,
	/// String-keyed map of one value shape.
	Map,
	/// Declared record type.
	Record {
		/// Record type name.
		name: &'static str,
	},
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Dynamic => f.write_str("any value"),
			Self::Boolean => f.write_str("boolean"),
			Self::Integer { name } | Self::Real { name } => f.write_str(name),
			Self::String => f.write_str("string"),
			Self::Blob => f.write_str("data"),
			Self::Timestamp => f.write_str("date"),
			Self::Uid => f.write_str("uid"),
			Self::Sequence => f.write_str("array"),
			Self::Map => f.write_str("dictionary"),
			Self::Record { name } => write!(f, "record {name}"),
		}
	}
}
