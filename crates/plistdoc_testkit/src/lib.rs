//! Shared test helpers for workspace crates.
//!
//! [`xml_doc`] wraps an element body in the standard XML plist prologue.
//! [`BplistBuilder`] assembles `bplist00` documents object by object, including
//! deliberately inconsistent ones, without going through the crate's own writer.

/// Wrap `body` in an XML declaration, the Apple DOCTYPE, and `<plist version="1.0">`.
pub fn xml_doc(body: &str) -> String {
	format!(
		concat!(
			"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
			"<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
			"\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
			"<plist version=\"1.0\">\n{}\n</plist>\n"
		),
		body
	)
}

/// Raw trailer values used by [`BplistBuilder::build_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerFields {
	/// Byte width of each offset table entry.
	pub offset_width: u8,
	/// Byte width of each object reference.
	pub ref_width: u8,
	/// Declared object count.
	pub object_count: u64,
	/// Root object index.
	pub root: u64,
	/// Absolute offset of the offset table.
	pub offset_table_start: u64,
}

/// Byte-level `bplist00` assembler.
///
/// Objects are appended in call order and addressed by the returned index. References
/// are always one byte wide and offsets always two bytes wide unless the trailer is
/// overridden through [`BplistBuilder::build_with`].
#[derive(Debug, Default, Clone)]
pub struct BplistBuilder {
	objects: Vec<Vec<u8>>,
}

impl BplistBuilder {
	/// Create an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append one pre-encoded object (marker byte plus payload).
	pub fn raw(&mut self, bytes: impl Into<Vec<u8>>) -> u8 {
		self.objects.push(bytes.into());
		u8::try_from(self.objects.len() - 1).expect("builder holds at most 256 objects")
	}

	/// Append an ASCII string object shorter than 15 bytes.
	pub fn ascii(&mut self, text: &str) -> u8 {
		assert!(text.len() < 15 && text.is_ascii(), "short ascii only");
		let mut bytes = vec![0x50 | text.len() as u8];
		bytes.extend_from_slice(text.as_bytes());
		self.raw(bytes)
	}

	/// Append a one-byte integer object.
	pub fn int(&mut self, value: u8) -> u8 {
		self.raw([0x10, value])
	}

	/// Append an array object referencing `items`.
	pub fn array(&mut self, items: &[u8]) -> u8 {
		assert!(items.len() < 15, "short arrays only");
		let mut bytes = vec![0xA0 | items.len() as u8];
		bytes.extend_from_slice(items);
		self.raw(bytes)
	}

	/// Append a dictionary object referencing `(key, value)` pairs.
	pub fn dict(&mut self, entries: &[(u8, u8)]) -> u8 {
		assert!(entries.len() < 15, "short dictionaries only");
		let mut bytes = vec![0xD0 | entries.len() as u8];
		bytes.extend(entries.iter().map(|(key, _)| *key));
		bytes.extend(entries.iter().map(|(_, value)| *value));
		self.raw(bytes)
	}

	/// Assemble the document with a consistent trailer.
	pub fn build(&self, root: u8) -> Vec<u8> {
		self.build_with(root, |_| {})
	}

	/// Assemble the document, letting `tweak` alter the trailer before it is written.
	pub fn build_with(&self, root: u8, tweak: impl FnOnce(&mut TrailerFields)) -> Vec<u8> {
		let mut out = b"bplist00".to_vec();
		let mut offsets = Vec::with_capacity(self.objects.len());
		for object in &self.objects {
			offsets.push(out.len() as u16);
			out.extend_from_slice(object);
		}

		let offset_table_start = out.len() as u64;
		for offset in offsets {
			out.extend_from_slice(&offset.to_be_bytes());
		}

		let mut fields = TrailerFields {
			offset_width: 2,
			ref_width: 1,
			object_count: self.objects.len() as u64,
			root: u64::from(root),
			offset_table_start,
		};
		tweak(&mut fields);

		out.extend_from_slice(&[0; 6]);
		out.push(fields.offset_width);
		out.push(fields.ref_width);
		out.extend_from_slice(&fields.object_count.to_be_bytes());
		out.extend_from_slice(&fields.root.to_be_bytes());
		out.extend_from_slice(&fields.offset_table_start.to_be_bytes());
		out
	}
}
