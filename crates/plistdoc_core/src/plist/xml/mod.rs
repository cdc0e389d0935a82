use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::plist::{Dictionary, Integer, PlistError, ReadOptions, Result, Value};

/// `<date>` text layout.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Scalar element whose text content is collected until its end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
	String,
	Integer,
	Real,
	Date,
	Data,
	True,
	False,
}

impl Leaf {
	fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"string" => Self::String,
			"integer" => Self::Integer,
			"real" => Self::Real,
			"date" => Self::Date,
			"data" => Self::Data,
			"true" => Self::True,
			"false" => Self::False,
			_ => return None,
		})
	}

	fn name(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::Date => "date",
			Self::Data => "data",
			Self::True => "true",
			Self::False => "false",
		}
	}
}

/// Open element on the builder stack.
#[derive(Debug)]
enum Frame {
	Plist(Option<Value>),
	Array(Vec<Value>),
	Dict { entries: Dictionary, key: Option<String> },
	Key(String),
	Leaf(Leaf, String),
}

impl Frame {
	fn name(&self) -> &'static str {
		match self {
			Self::Plist(_) => "plist",
			Self::Array(_) => "array",
			Self::Dict { .. } => "dict",
			Self::Key(_) => "key",
			Self::Leaf(leaf, _) => leaf.name(),
		}
	}

	fn text_mut(&mut self) -> Option<&mut String> {
		match self {
			Self::Key(text) | Self::Leaf(_, text) => Some(text),
			_ => None,
		}
	}
}

/// Assembles a value tree from XML tokenizer events.
///
/// Only one element is pending at a time: scalars collect text until their end tag,
/// containers collect finished children.
#[derive(Debug)]
struct TreeBuilder {
	stack: Vec<Frame>,
	max_depth: u32,
}

impl TreeBuilder {
	fn new(max_depth: u32) -> Self {
		Self {
			stack: Vec::new(),
			max_depth,
		}
	}

	fn start(&mut self, name: &str) -> Result<()> {
		let Some(top) = self.stack.last() else {
			if name == "plist" {
				self.stack.push(Frame::Plist(None));
				return Ok(());
			}
			return Err(PlistError::UnexpectedElement {
				name: name.to_owned(),
				context: "document root",
			});
		};

		match top {
			Frame::Key(_) | Frame::Leaf(..) => {
				return Err(PlistError::UnexpectedElement {
					name: name.to_owned(),
					context: "text element",
				});
			}
			Frame::Dict { key: None, .. } if name != "key" => {
				if is_value_element(name) {
					return Err(PlistError::MissingKey { name: name.to_owned() });
				}
			}
			Frame::Dict { key: Some(key), .. } if name == "key" => {
				return Err(PlistError::MissingValue { key: key.clone() });
			}
			Frame::Plist(_) | Frame::Array(_) if name == "key" => {
				return Err(PlistError::UnexpectedElement {
					name: name.to_owned(),
					context: top.name(),
				});
			}
			_ => {}
		}

		let frame = match name {
			"key" => Frame::Key(String::new()),
			"array" => Frame::Array(Vec::new()),
			"dict" => Frame::Dict {
				entries: Dictionary::new(),
				key: None,
			},
			"plist" => {
				return Err(PlistError::UnexpectedElement {
					name: name.to_owned(),
					context: top.name(),
				});
			}
			_ => match Leaf::from_name(name) {
				Some(leaf) => Frame::Leaf(leaf, String::new()),
				None => return Err(PlistError::UnknownElement { name: name.to_owned() }),
			},
		};

		// the `<plist>` frame sits below the root value, which is depth 0
		let depth = self.stack.len() - 1;
		if depth > self.max_depth as usize {
			return Err(PlistError::DepthExceeded {
				max_depth: self.max_depth,
			});
		}
		self.stack.push(frame);
		Ok(())
	}

	fn text(&mut self, text: &str) -> Result<()> {
		let Some(frame) = self.stack.last_mut() else {
			if text.trim().is_empty() {
				return Ok(());
			}
			return Err(PlistError::UnexpectedText { context: "document root" });
		};

		if let Some(buf) = frame.text_mut() {
			buf.push_str(text);
			return Ok(());
		}
		if text.trim().is_empty() {
			return Ok(());
		}
		Err(PlistError::UnexpectedText { context: frame.name() })
	}

	/// Close the innermost element; returns the root value once `</plist>` closes.
	fn end(&mut self, name: &str) -> Result<Option<Value>> {
		let frame = self.stack.pop().ok_or_else(|| PlistError::MismatchedEndTag {
			expected: String::new(),
			found: name.to_owned(),
		})?;
		if frame.name() != name {
			return Err(PlistError::MismatchedEndTag {
				expected: frame.name().to_owned(),
				found: name.to_owned(),
			});
		}

		let value = match frame {
			Frame::Plist(root) => return root.map(Some).ok_or(PlistError::EmptyPlist),
			Frame::Key(key) => {
				if let Some(Frame::Dict { key: slot, .. }) = self.stack.last_mut() {
					*slot = Some(key);
				}
				return Ok(None);
			}
			Frame::Array(items) => Value::Array(items),
			Frame::Dict { entries, key } => {
				if let Some(key) = key {
					return Err(PlistError::MissingValue { key });
				}
				Value::Dictionary(entries)
			}
			Frame::Leaf(leaf, text) => parse_leaf(leaf, &text)?,
		};

		match self.stack.last_mut() {
			Some(Frame::Plist(root)) => {
				if root.is_some() {
					return Err(PlistError::MultipleRoots);
				}
				*root = Some(value);
			}
			Some(Frame::Array(items)) => items.push(value),
			Some(Frame::Dict { entries, key }) => {
				// `start` rejects dictionary values without a pending key
				if let Some(key) = key.take() {
					entries.insert(key, value);
				}
			}
			_ => {}
		}
		Ok(None)
	}

	fn is_empty(&self) -> bool {
		self.stack.is_empty()
	}
}

fn is_value_element(name: &str) -> bool {
	matches!(name, "array" | "dict") || Leaf::from_name(name).is_some()
}

fn parse_leaf(leaf: Leaf, text: &str) -> Result<Value> {
	match leaf {
		Leaf::String => Ok(Value::String(text.to_owned())),
		Leaf::Integer => parse_integer(text).map(Value::Integer),
		Leaf::Real => {
			let trimmed = text.trim();
			trimmed
				.parse::<f64>()
				.map(Value::Real)
				.map_err(|_| PlistError::InvalidReal { text: trimmed.to_owned() })
		}
		Leaf::Date => {
			let trimmed = text.trim();
			NaiveDateTime::parse_from_str(trimmed, DATE_FORMAT)
				.map(|naive| Value::Date(naive.and_utc()))
				.map_err(|_| PlistError::InvalidDate { text: trimmed.to_owned() })
		}
		Leaf::Data => {
			let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
			Ok(Value::Data(STANDARD.decode(compact)?))
		}
		Leaf::True | Leaf::False => {
			if !text.trim().is_empty() {
				return Err(PlistError::UnexpectedText { context: leaf.name() });
			}
			Ok(Value::Boolean(leaf == Leaf::True))
		}
	}
}

fn parse_integer(text: &str) -> Result<Integer> {
	let trimmed = text.trim();
	if let Ok(value) = trimmed.parse::<i64>() {
		return Ok(Integer::Signed(value));
	}
	let invalid = || PlistError::InvalidInteger { text: trimmed.to_owned() };
	if trimmed.starts_with('-') {
		return Err(invalid());
	}
	trimmed.parse::<u128>().map(Integer::Unsigned).map_err(|_| invalid())
}

/// Resolve a predefined entity or character reference name (without `&` and `;`).
fn resolve_entity(name: &str) -> Result<String> {
	if let Some(reference) = name.strip_prefix('#') {
		let code = match reference.strip_prefix('x').or_else(|| reference.strip_prefix('X')) {
			Some(hex) => u32::from_str_radix(hex, 16).ok(),
			None => reference.parse::<u32>().ok(),
		};
		return code
			.and_then(char::from_u32)
			.map(String::from)
			.ok_or_else(|| PlistError::UnknownEntity { name: name.to_owned() });
	}

	quick_xml::escape::resolve_predefined_entity(name)
		.map(str::to_owned)
		.ok_or_else(|| PlistError::UnknownEntity { name: name.to_owned() })
}

fn utf8(bytes: &[u8]) -> Result<&str> {
	std::str::from_utf8(bytes).map_err(|_| PlistError::InvalidUtf8)
}

/// Parse one XML plist document from the start of `bytes`.
///
/// Returns the root value and the number of bytes consumed through `</plist>`.
pub(crate) fn parse_document(bytes: &[u8], max_depth: u32) -> Result<(Value, usize)> {
	let mut reader = Reader::from_reader(bytes);
	let mut builder = TreeBuilder::new(max_depth);
	let mut buf = Vec::new();

	loop {
		let event = reader.read_event_into(&mut buf)?;
		let finished = match event {
			Event::Start(start) => {
				builder.start(utf8(start.name().as_ref())?)?;
				None
			}
			Event::Empty(start) => {
				let qname = start.name();
				let name = utf8(qname.as_ref())?;
				builder.start(name)?;
				builder.end(name)?
			}
			Event::End(end) => builder.end(utf8(end.name().as_ref())?)?,
			Event::Text(text) => {
				builder.text(utf8(&text)?)?;
				None
			}
			Event::CData(data) => {
				builder.text(utf8(&data)?)?;
				None
			}
			Event::GeneralRef(reference) => {
				builder.text(&resolve_entity(utf8(&reference)?)?)?;
				None
			}
			Event::Eof => {
				return Err(if builder.is_empty() {
					PlistError::EmptyInput
				} else {
					PlistError::UnexpectedXmlEof
				});
			}
			// declaration, doctype, comments, processing instructions
			_ => None,
		};

		if let Some(root) = finished {
			let consumed = usize::try_from(reader.buffer_position()).unwrap_or(bytes.len());
			log::trace!("xml plist document parsed, {consumed} bytes consumed");
			return Ok((root, consumed));
		}
		buf.clear();
	}
}

/// Check that `bytes[start..]` holds only whitespace, comments, and processing
/// instructions.
pub(crate) fn ensure_document_end(bytes: &[u8], start: usize) -> Result<()> {
	let rest = bytes.get(start..).unwrap_or_default();
	let mut reader = Reader::from_reader(rest);
	let mut buf = Vec::new();

	loop {
		let at = start + usize::try_from(reader.buffer_position()).unwrap_or(rest.len());
		match reader.read_event_into(&mut buf)? {
			Event::Eof => return Ok(()),
			Event::Comment(_) | Event::PI(_) => {}
			Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
			_ => return Err(PlistError::TrailingContent { at }),
		}
		buf.clear();
	}
}

/// Parse a complete XML plist document with default options.
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Value> {
	from_xml_bytes_with(bytes, &ReadOptions::default())
}

/// Parse a complete XML plist document; only whitespace and comments may follow `</plist>`.
pub fn from_xml_bytes_with(bytes: &[u8], options: &ReadOptions) -> Result<Value> {
	let (value, consumed) = parse_document(bytes, options.max_depth)?;
	ensure_document_end(bytes, consumed)?;
	Ok(value)
}
