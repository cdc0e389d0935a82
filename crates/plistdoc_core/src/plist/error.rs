use thiserror::Error;

use crate::plist::{Integer, Kind, PathStep, Shape};
use crate::plist::path::KeyPath;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PlistError>;

/// Coarse error category used by callers that only branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	/// Reading the underlying stream failed.
	Io,
	/// Input bytes are not a well-formed plist document.
	Malformed,
	/// A value kind does not fit the requested target shape.
	TypeMismatch,
	/// An integer does not fit the requested target width.
	OutOfRange,
}

/// Errors produced while parsing plist documents and decoding them into typed targets.
#[derive(Debug, Error)]
pub enum PlistError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Input contained no document at all.
	#[error("empty input: no plist document found")]
	EmptyInput,
	/// Buffer cannot hold the binary header and trailer.
	#[error("binary plist too short: {len} bytes (need at least {min})")]
	TooShort {
		/// Actual buffer length.
		len: usize,
		/// Minimum length for header plus trailer.
		min: usize,
	},
	/// Leading eight bytes are not `bplist00`.
	#[error("bad binary plist magic {magic:?}")]
	BadMagic {
		/// First eight bytes of the buffer.
		magic: [u8; 8],
	},
	/// Trailer declares an unsupported integer width.
	#[error("invalid trailer {field} width {width} (expected 1..=8)")]
	InvalidTrailerWidth {
		/// Trailer field being validated.
		field: &'static str,
		/// Declared byte width.
		width: u8,
	},
	/// Offset table does not fit between the object region and the trailer.
	#[error("offset table at {start} ({count} entries of {width} bytes) passes table end {end}")]
	OffsetTableOutOfRange {
		/// Declared offset table start.
		start: u64,
		/// Declared object count.
		count: u64,
		/// Declared offset entry width.
		width: u8,
		/// First trailer byte offset.
		end: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Object reference or root index is not below the object count.
	#[error("object index {index} out of range (count={count})")]
	ObjectIndexOutOfRange {
		/// Offending object index.
		index: u64,
		/// Declared object count.
		count: u64,
	},
	/// Offset table entry points outside the object region.
	#[error("object {index} offset {offset} outside object region 8..{end}")]
	OffsetOutOfRange {
		/// Object index whose offset was read.
		index: u64,
		/// Offending byte offset.
		offset: u64,
		/// End of the object region.
		end: usize,
	},
	/// Marker byte does not name a supported object type.
	#[error("unknown object marker 0x{marker:02x} at offset {at}")]
	UnknownMarker {
		/// Raw marker byte.
		marker: u8,
		/// Byte offset of the marker.
		at: usize,
	},
	/// Integer or real marker declares a width this format does not define.
	#[error("unsupported numeric width in marker 0x{marker:02x} at offset {at}")]
	InvalidNumericWidth {
		/// Raw marker byte.
		marker: u8,
		/// Byte offset of the marker.
		at: usize,
	},
	/// UID wider than 64 bits.
	#[error("uid width {width} at offset {at} exceeds 8 bytes")]
	UidTooWide {
		/// Declared byte width.
		width: usize,
		/// Byte offset of the marker.
		at: usize,
	},
	/// Extended length object is not a non-negative integer.
	#[error("invalid object length at offset {at}")]
	InvalidLength {
		/// Byte offset of the length object.
		at: usize,
	},
	/// Binary date payload is not a representable instant.
	#[error("invalid absolute time {secs} at offset {at}")]
	InvalidAbsoluteTime {
		/// Seconds since 2001-01-01T00:00:00Z.
		secs: f64,
		/// Byte offset of the marker.
		at: usize,
	},
	/// UTF-16 string payload contains unpaired surrogates.
	#[error("invalid utf-16 string at offset {at}")]
	InvalidUtf16 {
		/// Byte offset of the marker.
		at: usize,
	},
	/// Dictionary key object is not a string.
	#[error("dictionary key object {index} is {found}, expected string")]
	InvalidDictionaryKey {
		/// Object index of the key.
		index: u64,
		/// Kind of the decoded key object.
		found: Kind,
	},
	/// Object graph references an object that is still being parsed.
	#[error("object reference cycle at object {index}")]
	Cycle {
		/// Object index that closed the cycle.
		index: u64,
	},
	/// Container nesting exceeded the configured limit.
	#[error("nesting depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Decoded tree would hold more nodes than the configured budget.
	#[error("node budget exceeded (max={max_nodes})")]
	NodeLimitExceeded {
		/// Configured node ceiling.
		max_nodes: u64,
	},
	/// XML tokenizer failure.
	#[error("xml: {0}")]
	Xml(#[from] quick_xml::Error),
	/// XML text is not valid UTF-8.
	#[error("xml text is not valid utf-8")]
	InvalidUtf8,
	/// Element name outside the plist vocabulary.
	#[error("unknown plist element <{name}>")]
	UnknownElement {
		/// Element name.
		name: String,
	},
	/// Known element in a position where it is not allowed.
	#[error("unexpected element <{name}> in {context}")]
	UnexpectedElement {
		/// Element name.
		name: String,
		/// Enclosing construct.
		context: &'static str,
	},
	/// End tag does not close the innermost open element.
	#[error("mismatched end tag </{found}>, expected </{expected}>")]
	MismatchedEndTag {
		/// Innermost open element.
		expected: String,
		/// End tag actually seen.
		found: String,
	},
	/// Non-whitespace text where only elements are allowed.
	#[error("unexpected text in {context}")]
	UnexpectedText {
		/// Enclosing construct.
		context: &'static str,
	},
	/// Dictionary key without a following value element.
	#[error("dictionary key {key:?} has no value")]
	MissingValue {
		/// Dangling key.
		key: String,
	},
	/// Dictionary value element without a preceding key.
	#[error("dictionary value <{name}> has no key")]
	MissingKey {
		/// Value element name.
		name: String,
	},
	/// Document ended before the root element closed.
	#[error("unexpected end of xml document")]
	UnexpectedXmlEof,
	/// `<plist>` element contains no value.
	#[error("plist element contains no value")]
	EmptyPlist,
	/// `<plist>` element contains more than one value.
	#[error("plist element contains more than one value")]
	MultipleRoots,
	/// Markup other than whitespace or comments follows the closing `</plist>`.
	#[error("unexpected content after plist document at offset {at}")]
	TrailingContent {
		/// Byte offset of the first unexpected event.
		at: usize,
	},
	/// Entity reference other than the predefined XML entities or a character reference.
	#[error("unknown entity &{name};")]
	UnknownEntity {
		/// Entity name without `&` and `;`.
		name: String,
	},
	/// `<integer>` text is not a base-10 integer.
	#[error("invalid integer literal {text:?}")]
	InvalidInteger {
		/// Offending text.
		text: String,
	},
	/// `<real>` text is not a floating-point literal.
	#[error("invalid real literal {text:?}")]
	InvalidReal {
		/// Offending text.
		text: String,
	},
	/// `<date>` text is not an ISO-8601 UTC timestamp.
	#[error("invalid date literal {text:?}")]
	InvalidDate {
		/// Offending text.
		text: String,
	},
	/// `<data>` text is not valid base64.
	#[error("invalid base64 data: {0}")]
	InvalidBase64(#[from] base64::DecodeError),
	/// Value kind does not match the target shape.
	#[error("type mismatch at {path}: expected {expected}, found {found}")]
	TypeMismatch {
		/// Requested target shape.
		expected: Shape,
		/// Kind of the source value.
		found: Kind,
		/// Location of the source value.
		path: KeyPath,
	},
	/// Integer does not fit the target width or signedness.
	#[error("integer {value} at {path} out of range for {target}")]
	IntegerOutOfRange {
		/// Source integer.
		value: Integer,
		/// Target type name.
		target: &'static str,
		/// Location of the source value.
		path: KeyPath,
	},
}

impl PlistError {
	/// Classify this error into a coarse category.
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::Io(_) => ErrorCategory::Io,
			Self::TypeMismatch { .. } => ErrorCategory::TypeMismatch,
			Self::IntegerOutOfRange { .. } => ErrorCategory::OutOfRange,
			_ => ErrorCategory::Malformed,
		}
	}

	/// Return `true` for malformed-input and out-of-bounds reference errors.
	pub fn is_malformed(&self) -> bool {
		self.category() == ErrorCategory::Malformed
	}

	/// Return the source location for decode errors.
	pub fn path(&self) -> Option<&KeyPath> {
		match self {
			Self::TypeMismatch { path, .. } | Self::IntegerOutOfRange { path, .. } => Some(path),
			_ => None,
		}
	}

	/// Prefix the location of a decode error with an enclosing container step.
	pub(crate) fn within(mut self, step: PathStep) -> Self {
		if let Self::TypeMismatch { path, .. } | Self::IntegerOutOfRange { path, .. } = &mut self {
			path.push_front(step);
		}
		self
	}
}
