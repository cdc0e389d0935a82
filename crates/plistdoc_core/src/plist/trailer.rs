use crate::plist::bytes::Cursor;
use crate::plist::{PlistError, Result};

/// Binary plist magic and format version.
pub const BINARY_MAGIC: &[u8; 8] = b"bplist00";

/// Parsed `bplist00` trailer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
	/// Sort version byte (informational).
	pub sort_version: u8,
	/// Byte width of each offset table entry.
	pub offset_width: u8,
	/// Byte width of each object reference inside containers.
	pub ref_width: u8,
	/// Number of objects in the object table.
	pub object_count: u64,
	/// Index of the root object.
	pub root_object: u64,
	/// Absolute byte offset of the offset table.
	pub offset_table_start: u64,
}

impl Trailer {
	/// Trailer size in bytes.
	pub const SIZE: usize = 32;
	/// Magic header size in bytes.
	pub const HEADER_SIZE: usize = 8;
	/// Smallest buffer that can hold header and trailer.
	pub const MIN_DOCUMENT_SIZE: usize = Self::HEADER_SIZE + Self::SIZE;
	/// Leading reserved bytes of the trailer.
	const UNUSED_SIZE: usize = 5;

	/// Validate the magic and parse the trailer from the last 32 bytes of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < Self::MIN_DOCUMENT_SIZE {
			return Err(PlistError::TooShort {
				len: bytes.len(),
				min: Self::MIN_DOCUMENT_SIZE,
			});
		}

		if &bytes[..Self::HEADER_SIZE] != BINARY_MAGIC {
			let mut magic = [0_u8; 8];
			magic.copy_from_slice(&bytes[..Self::HEADER_SIZE]);
			return Err(PlistError::BadMagic { magic });
		}

		let mut cursor = Cursor::at(bytes, bytes.len() - Self::SIZE);
		let _ = cursor.read_exact(Self::UNUSED_SIZE)?;
		let sort_version = cursor.read_u8()?;
		let offset_width = parse_width(cursor.read_u8()?, "offset")?;
		let ref_width = parse_width(cursor.read_u8()?, "object reference")?;
		let object_count = cursor.read_u64_be()?;
		let root_object = cursor.read_u64_be()?;
		let offset_table_start = cursor.read_u64_be()?;

		Ok(Self {
			sort_version,
			offset_width,
			ref_width,
			object_count,
			root_object,
			offset_table_start,
		})
	}

	/// Byte offset where the trailer begins in a buffer of `len` bytes.
	pub fn start_in(len: usize) -> usize {
		len.saturating_sub(Self::SIZE)
	}
}

fn parse_width(width: u8, field: &'static str) -> Result<u8> {
	if (1..=8).contains(&width) {
		Ok(width)
	} else {
		Err(PlistError::InvalidTrailerWidth { field, width })
	}
}

#[cfg(test)]
mod tests;
