use crate::plist::{PlistError, Result};

/// Low-nibble value signalling that an integer length object follows the marker.
pub(crate) const EXTENDED_LEN: u8 = 0x0F;

/// Classified object marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
	/// `0x08` / `0x09`.
	Boolean(bool),
	/// `0x1n`: integer of `2^n` bytes.
	Integer {
		/// Base-2 log of the payload width.
		log2_width: u8,
	},
	/// `0x2n`: IEEE real of `2^n` bytes.
	Real {
		/// Base-2 log of the payload width.
		log2_width: u8,
	},
	/// `0x33`: absolute time as an IEEE double.
	Date,
	/// `0x4n`: raw bytes.
	Data(u8),
	/// `0x5n`: one byte per character.
	Ascii(u8),
	/// `0x6n`: UTF-16 big-endian code units.
	Utf16(u8),
	/// `0x8n`: unsigned reference of `n + 1` bytes.
	Uid(u8),
	/// `0xAn`: object references.
	Array(u8),
	/// `0xDn`: key references then value references.
	Dictionary(u8),
}

impl Marker {
	/// Classify a marker byte read at `at`.
	pub fn parse(byte: u8, at: usize) -> Result<Self> {
		let low = byte & 0x0F;
		let marker = match byte >> 4 {
			0x0 => match byte {
				0x08 => Self::Boolean(false),
				0x09 => Self::Boolean(true),
				// null (0x00) and fill (0x0F) carry no value in this model
				_ => return Err(PlistError::UnknownMarker { marker: byte, at }),
			},
			0x1 => Self::Integer { log2_width: low },
			0x2 => Self::Real { log2_width: low },
			0x3 if low == 0x3 => Self::Date,
			0x4 => Self::Data(low),
			0x5 => Self::Ascii(low),
			0x6 => Self::Utf16(low),
			0x8 => Self::Uid(low),
			0xA => Self::Array(low),
			0xD => Self::Dictionary(low),
			_ => return Err(PlistError::UnknownMarker { marker: byte, at }),
		};
		Ok(marker)
	}

	/// Build a marker byte from a type nibble and a length that fits the low nibble.
	pub fn compose(kind: u8, low: u8) -> u8 {
		(kind << 4) | (low & 0x0F)
	}
}
