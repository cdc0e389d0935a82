use crate::plist::bytes::{Cursor, be_uint};
use crate::plist::marker::{EXTENDED_LEN, Marker};
use crate::plist::value::date_from_absolute_time;
use crate::plist::{Dictionary, Integer, PlistError, Result, Trailer, Uid, Value};

/// Runtime limits for plist parsing.
#[derive(Debug, Clone)]
pub struct ReadOptions {
	/// Maximum container nesting depth.
	pub max_depth: u32,
	/// Maximum number of values a binary document may expand to, counting every
	/// repeated reference to a shared object with its full subtree.
	pub max_nodes: u64,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			max_nodes: 1 << 22,
		}
	}
}

impl ReadOptions {
	/// Preset for inputs from untrusted sources.
	pub fn untrusted() -> Self {
		Self {
			max_depth: 64,
			max_nodes: 1 << 16,
		}
	}
}

/// Parse state of one object table slot.
#[derive(Debug, Clone)]
enum Slot {
	Pending,
	InProgress,
	/// Parsed value and the number of nodes in its subtree.
	Done(Value, u64),
}

/// Reader for one `bplist00` document.
///
/// Objects are parsed on demand and memoized by object index, so an object referenced
/// from several containers is decoded once and cloned for each reference. Every clone
/// is charged against [`ReadOptions::max_nodes`].
pub struct BinaryReader<'a> {
	bytes: &'a [u8],
	trailer: Trailer,
	options: ReadOptions,
	slots: Vec<Slot>,
	nodes: u64,
}

impl<'a> BinaryReader<'a> {
	/// Validate the header, trailer, and offset table bounds of `bytes`.
	pub fn new(bytes: &'a [u8], options: ReadOptions) -> Result<Self> {
		let trailer = Trailer::parse(bytes)?;
		let table_end = Trailer::start_in(bytes.len());

		let table_len = trailer.object_count.checked_mul(u64::from(trailer.offset_width));
		let table_fits = table_len
			.and_then(|len| trailer.offset_table_start.checked_add(len))
			.is_some_and(|end| {
				trailer.offset_table_start >= Trailer::HEADER_SIZE as u64 && end <= table_end as u64
			});
		if !table_fits {
			return Err(PlistError::OffsetTableOutOfRange {
				start: trailer.offset_table_start,
				count: trailer.object_count,
				width: trailer.offset_width,
				end: table_end,
			});
		}

		if trailer.root_object >= trailer.object_count {
			return Err(PlistError::ObjectIndexOutOfRange {
				index: trailer.root_object,
				count: trailer.object_count,
			});
		}

		log::debug!(
			"bplist trailer: objects={} root={} offset_width={} ref_width={} table_start={}",
			trailer.object_count,
			trailer.root_object,
			trailer.offset_width,
			trailer.ref_width,
			trailer.offset_table_start
		);

		// the table fits inside `bytes`, so the count is bounded by the buffer length
		let count = trailer.object_count as usize;
		Ok(Self {
			bytes,
			trailer,
			options,
			slots: vec![Slot::Pending; count],
			nodes: 0,
		})
	}

	/// Parsed trailer.
	pub fn trailer(&self) -> Trailer {
		self.trailer
	}

	/// Number of objects in the object table.
	pub fn object_count(&self) -> usize {
		self.slots.len()
	}

	/// Decode the root object and everything reachable from it.
	pub fn read_root(&mut self) -> Result<Value> {
		self.resolve(self.trailer.root_object, 0)
	}

	/// Decode the object at `index` and everything reachable from it.
	pub fn read_object(&mut self, index: u64) -> Result<Value> {
		self.resolve(index, 0)
	}

	/// Absolute byte offset of object `index`, read from the offset table.
	pub fn object_offset(&self, index: u64) -> Result<usize> {
		if index >= self.trailer.object_count {
			return Err(PlistError::ObjectIndexOutOfRange {
				index,
				count: self.trailer.object_count,
			});
		}

		let width = usize::from(self.trailer.offset_width);
		// bounds were validated in `new`
		let entry = self.trailer.offset_table_start as usize + index as usize * width;
		let offset = Cursor::at(self.bytes, entry).read_uint_be(width)?;

		let end = self.objects_end();
		if offset < Trailer::HEADER_SIZE as u64 || offset >= end as u64 {
			return Err(PlistError::OffsetOutOfRange { index, offset, end });
		}
		Ok(offset as usize)
	}

	fn objects_end(&self) -> usize {
		self.trailer.offset_table_start as usize
	}

	fn resolve(&mut self, index: u64, depth: u32) -> Result<Value> {
		if depth > self.options.max_depth {
			return Err(PlistError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let offset = self.object_offset(index)?;
		let slot = index as usize;
		let cached_size = match &self.slots[slot] {
			Slot::Done(_, size) => Some(*size),
			Slot::InProgress => return Err(PlistError::Cycle { index }),
			Slot::Pending => None,
		};
		if let Some(size) = cached_size {
			self.charge(size)?;
			if let Slot::Done(value, _) = &self.slots[slot] {
				return Ok(value.clone());
			}
		}

		self.charge(1)?;
		let before = self.nodes;
		self.slots[slot] = Slot::InProgress;
		let value = self.parse_object(offset, depth);
		self.slots[slot] = match &value {
			Ok(value) => Slot::Done(value.clone(), self.nodes - before + 1),
			Err(_) => Slot::Pending,
		};
		value
	}

	/// Count `nodes` more values against the node budget.
	fn charge(&mut self, nodes: u64) -> Result<()> {
		self.nodes = self.nodes.saturating_add(nodes);
		if self.nodes > self.options.max_nodes {
			return Err(PlistError::NodeLimitExceeded {
				max_nodes: self.options.max_nodes,
			});
		}
		Ok(())
	}

	fn parse_object(&mut self, offset: usize, depth: u32) -> Result<Value> {
		let bytes = self.bytes;
		let objects = &bytes[..self.objects_end()];
		let mut cursor = Cursor::at(objects, offset);
		let at = cursor.pos();
		let byte = cursor.read_u8()?;

		match Marker::parse(byte, at)? {
			Marker::Boolean(value) => Ok(Value::Boolean(value)),
			Marker::Integer { log2_width } => {
				Ok(Value::Integer(read_integer(&mut cursor, byte, log2_width, at)?))
			}
			Marker::Real { log2_width } => match log2_width {
				2 => Ok(Value::Real(f64::from(cursor.read_f32_be()?))),
				3 => Ok(Value::Real(cursor.read_f64_be()?)),
				_ => Err(PlistError::InvalidNumericWidth { marker: byte, at }),
			},
			Marker::Date => {
				let secs = cursor.read_f64_be()?;
				let date = date_from_absolute_time(secs)
					.ok_or(PlistError::InvalidAbsoluteTime { secs, at })?;
				Ok(Value::Date(date))
			}
			Marker::Data(low) => {
				let len = read_len(&mut cursor, low)?;
				Ok(Value::Data(cursor.read_exact(len)?.to_vec()))
			}
			Marker::Ascii(low) => {
				let len = read_len(&mut cursor, low)?;
				let raw = cursor.read_exact(len)?;
				Ok(Value::String(raw.iter().map(|byte| char::from(*byte)).collect()))
			}
			Marker::Utf16(low) => {
				let len = read_len(&mut cursor, low)?;
				let raw = cursor.read_array(len, 2)?;
				let units = raw.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
				let text = char::decode_utf16(units)
					.collect::<std::result::Result<String, _>>()
					.map_err(|_| PlistError::InvalidUtf16 { at })?;
				Ok(Value::String(text))
			}
			Marker::Uid(low) => {
				let width = usize::from(low) + 1;
				if width > 8 {
					return Err(PlistError::UidTooWide { width, at });
				}
				Ok(Value::Uid(Uid(cursor.read_uint_be(width)?)))
			}
			Marker::Array(low) => {
				let count = read_len(&mut cursor, low)?;
				let refs = self.read_refs(&mut cursor, count)?;
				let mut items = Vec::with_capacity(count);
				for index in refs {
					items.push(self.resolve(index, depth + 1)?);
				}
				Ok(Value::Array(items))
			}
			Marker::Dictionary(low) => {
				let count = read_len(&mut cursor, low)?;
				let keys = self.read_refs(&mut cursor, count)?;
				let values = self.read_refs(&mut cursor, count)?;
				let mut dict = Dictionary::with_capacity(count);
				for (key_index, value_index) in keys.into_iter().zip(values) {
					let key = match self.resolve(key_index, depth + 1)? {
						Value::String(key) => key,
						other => {
							return Err(PlistError::InvalidDictionaryKey {
								index: key_index,
								found: other.kind(),
							});
						}
					};
					let value = self.resolve(value_index, depth + 1)?;
					dict.insert(key, value);
				}
				Ok(Value::Dictionary(dict))
			}
		}
	}

	fn read_refs(&self, cursor: &mut Cursor<'_>, count: usize) -> Result<Vec<u64>> {
		let width = usize::from(self.trailer.ref_width);
		let raw = cursor.read_array(count, width)?;
		Ok(raw.chunks_exact(width).map(be_uint).collect())
	}
}

fn read_integer(cursor: &mut Cursor<'_>, marker: u8, log2_width: u8, at: usize) -> Result<Integer> {
	match log2_width {
		0..=2 => Ok(Integer::Signed(cursor.read_uint_be(1 << log2_width)? as i64)),
		3 => Ok(Integer::Signed(cursor.read_i64_be()?)),
		4 => Ok(Integer::Unsigned(cursor.read_u128_be()?)),
		_ => Err(PlistError::InvalidNumericWidth { marker, at }),
	}
}

/// Read a length from the marker nibble, or from the integer object that follows it.
fn read_len(cursor: &mut Cursor<'_>, low: u8) -> Result<usize> {
	if low != EXTENDED_LEN {
		return Ok(usize::from(low));
	}

	let at = cursor.pos();
	let byte = cursor.read_u8()?;
	let Marker::Integer { log2_width } = Marker::parse(byte, at)? else {
		return Err(PlistError::InvalidLength { at });
	};
	read_integer(cursor, byte, log2_width, at)?
		.narrow::<usize>()
		.ok_or(PlistError::InvalidLength { at })
}

/// Parse a complete `bplist00` buffer with default options.
pub fn from_bytes(bytes: &[u8]) -> Result<Value> {
	from_bytes_with(bytes, ReadOptions::default())
}

/// Parse a complete `bplist00` buffer.
pub fn from_bytes_with(bytes: &[u8], options: ReadOptions) -> Result<Value> {
	BinaryReader::new(bytes, options)?.read_root()
}

#[cfg(test)]
mod tests;
