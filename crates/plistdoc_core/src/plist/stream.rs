use std::io::Read;

use crate::plist::sniff::{parse_complete, parse_document};
use crate::plist::{Decode, DecodeContext, Format, ReadOptions, Result, Value};

/// Parse a complete buffer (binary or XML) into a dynamic value tree.
pub fn parse_value(bytes: &[u8]) -> Result<Value> {
	parse_value_with(bytes, &ReadOptions::default()).map(|(_, value)| value)
}

/// Parse a complete buffer and report which format it was.
///
/// The buffer must hold exactly one document; see [`Decoder`] for concatenated input.
pub fn parse_value_with(bytes: &[u8], options: &ReadOptions) -> Result<(Format, Value)> {
	parse_complete(bytes, options)
}

/// Parse a complete buffer (binary or XML) and decode it into `T`.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T> {
	let (format, value) = parse_value_with(bytes, &ReadOptions::default())?;
	T::decode(&value, &DecodeContext::from_format(format))
}

/// Sequential decoder over an open input.
///
/// The input is read to its end on the first decode call. Each call then parses the next
/// document from the current position: XML documents are consumed through their closing
/// `</plist>`, so several can be decoded back to back; a binary document consumes all
/// remaining bytes. A failed call leaves the position unchanged.
pub struct Decoder<R> {
	reader: R,
	options: ReadOptions,
	buf: Vec<u8>,
	pos: usize,
	loaded: bool,
}

impl<R: Read> Decoder<R> {
	/// Create a decoder with default read options.
	pub fn new(reader: R) -> Self {
		Self::with_options(reader, ReadOptions::default())
	}

	/// Create a decoder with explicit read options.
	pub fn with_options(reader: R, options: ReadOptions) -> Self {
		Self {
			reader,
			options,
			buf: Vec::new(),
			pos: 0,
			loaded: false,
		}
	}

	/// Parse the next document into a dynamic value tree.
	pub fn decode_value(&mut self) -> Result<(Format, Value)> {
		self.fill()?;
		let (format, value, consumed) = parse_document(&self.buf[self.pos..], &self.options)?;
		self.pos += consumed;
		Ok((format, value))
	}

	/// Parse the next document and decode it into `T`.
	pub fn decode<T: Decode>(&mut self) -> Result<T> {
		self.fill()?;
		let (format, value, consumed) = parse_document(&self.buf[self.pos..], &self.options)?;
		let decoded = T::decode(&value, &DecodeContext::from_format(format))?;
		self.pos += consumed;
		Ok(decoded)
	}

	/// Number of input bytes consumed by successful decode calls.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Return the underlying reader.
	pub fn into_inner(self) -> R {
		self.reader
	}

	fn fill(&mut self) -> Result<()> {
		if !self.loaded {
			self.reader.read_to_end(&mut self.buf)?;
			self.loaded = true;
		}
		Ok(())
	}
}
