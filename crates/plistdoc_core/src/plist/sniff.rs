use crate::plist::binary::BinaryReader;
use crate::plist::xml::{ensure_document_end, parse_document as parse_xml_document};
use crate::plist::{BINARY_MAGIC, PlistError, ReadOptions, Result, Value};

/// Serialized plist encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// `bplist00` binary layout.
	Binary,
	/// XML plist 1.0.
	Xml,
}

impl Format {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Binary => "binary",
			Self::Xml => "xml",
		}
	}
}

/// Detect the encoding from the leading byte signature.
pub fn sniff(bytes: &[u8]) -> Format {
	if bytes.starts_with(BINARY_MAGIC) {
		return Format::Binary;
	}
	Format::Xml
}

/// Parse one document from the start of `bytes`.
///
/// Returns the detected format, the root value, and the number of bytes consumed. A
/// binary document always consumes the whole buffer since its trailer is anchored at
/// the end.
pub(crate) fn parse_document(
	bytes: &[u8],
	options: &ReadOptions,
) -> Result<(Format, Value, usize)> {
	let format = sniff(bytes);
	log::trace!("sniffed {} plist ({} bytes)", format.as_str(), bytes.len());
	match format {
		Format::Binary => {
			let value = BinaryReader::new(bytes, options.clone())?.read_root()?;
			Ok((format, value, bytes.len()))
		}
		Format::Xml => {
			let start = bytes
				.iter()
				.position(|byte| !byte.is_ascii_whitespace())
				.ok_or(PlistError::EmptyInput)?;
			let (value, consumed) = parse_xml_document(&bytes[start..], options.max_depth)?;
			Ok((format, value, start + consumed))
		}
	}
}

/// Parse the single document that makes up all of `bytes`.
///
/// Anything after an XML document other than whitespace, comments, and processing
/// instructions is rejected.
pub(crate) fn parse_complete(bytes: &[u8], options: &ReadOptions) -> Result<(Format, Value)> {
	let (format, value, consumed) = parse_document(bytes, options)?;
	if consumed < bytes.len() {
		ensure_document_end(bytes, consumed)?;
	}
	Ok((format, value))
}

#[cfg(test)]
mod tests {
	use super::{Format, sniff};

	#[test]
	fn binary_magic_selects_binary_reader() {
		assert_eq!(sniff(b"bplist00\x09"), Format::Binary);
	}

	#[test]
	fn anything_else_is_xml() {
		assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), Format::Xml);
		assert_eq!(sniff(b"bplist01"), Format::Xml);
		assert_eq!(sniff(b"bpl"), Format::Xml);
		assert_eq!(sniff(b""), Format::Xml);
	}
}
