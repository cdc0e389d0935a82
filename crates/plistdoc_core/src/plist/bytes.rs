use crate::plist::{PlistError, Result};

/// Bounded big-endian cursor over an immutable byte slice.
pub(crate) struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at an absolute position.
	pub fn at(bytes: &'a [u8], pos: usize) -> Self {
		Self { bytes, pos }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(PlistError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read `count * width` bytes, reporting overflow as an unsatisfiable read.
	pub fn read_array(&mut self, count: usize, width: usize) -> Result<&'a [u8]> {
		let need = count.checked_mul(width).ok_or(PlistError::UnexpectedEof {
			at: self.pos,
			need: usize::MAX,
			rem: self.remaining(),
		})?;
		self.read_exact(need)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a big-endian unsigned integer of `width` bytes (1..=8).
	pub fn read_uint_be(&mut self, width: usize) -> Result<u64> {
		debug_assert!((1..=8).contains(&width));
		let raw = self.read_exact(width)?;
		Ok(be_uint(raw))
	}

	/// Read a big-endian `u64`.
	pub fn read_u64_be(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_be_bytes(buf))
	}

	/// Read a big-endian `i64`.
	pub fn read_i64_be(&mut self) -> Result<i64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(i64::from_be_bytes(buf))
	}

	/// Read a big-endian `u128`.
	pub fn read_u128_be(&mut self) -> Result<u128> {
		let raw = self.read_exact(16)?;
		let mut buf = [0_u8; 16];
		buf.copy_from_slice(raw);
		Ok(u128::from_be_bytes(buf))
	}

	/// Read a big-endian IEEE single.
	pub fn read_f32_be(&mut self) -> Result<f32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(f32::from_be_bytes(buf))
	}

	/// Read a big-endian IEEE double.
	pub fn read_f64_be(&mut self) -> Result<f64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(f64::from_be_bytes(buf))
	}
}

/// Fold up to eight big-endian bytes into a `u64`.
pub(crate) fn be_uint(raw: &[u8]) -> u64 {
	raw.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

#[cfg(test)]
mod tests {
	use super::{Cursor, be_uint};
	use crate::plist::PlistError;

	#[test]
	fn reads_big_endian_widths() {
		let bytes = [0x01, 0x02, 0x03, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe];
		let mut cursor = Cursor::at(&bytes, 0);
		assert_eq!(cursor.read_uint_be(3).expect("three bytes"), 0x010203);
		assert_eq!(cursor.read_i64_be().expect("eight bytes"), -2);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn short_read_reports_position_and_remaining() {
		let bytes = [0_u8; 4];
		let mut cursor = Cursor::at(&bytes, 2);
		let err = cursor.read_u64_be().expect_err("not enough bytes");
		assert!(matches!(err, PlistError::UnexpectedEof { at: 2, need: 8, rem: 2 }));
		assert_eq!(cursor.pos(), 2);
	}

	#[test]
	fn overflowing_array_read_fails() {
		let bytes = [0_u8; 4];
		let mut cursor = Cursor::at(&bytes, 0);
		assert!(cursor.read_array(usize::MAX, 2).is_err());
		assert_eq!(cursor.read_array(2, 2).expect("fits").len(), 4);
	}

	#[test]
	fn folds_bytes() {
		assert_eq!(be_uint(&[]), 0);
		assert_eq!(be_uint(&[0x12, 0x34]), 0x1234);
	}
}
