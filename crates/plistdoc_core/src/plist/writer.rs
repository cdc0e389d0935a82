use std::io::Write;

use crate::plist::marker::{EXTENDED_LEN, Marker};
use crate::plist::value::absolute_time_from_date;
use crate::plist::{BINARY_MAGIC, Integer, Result, Trailer, Value};

/// One entry of the flattened object table.
enum Node<'v> {
	Value(&'v Value),
	Key(&'v str),
	Array(Vec<u64>),
	Dictionary { keys: Vec<u64>, values: Vec<u64> },
}

/// Serialize a value tree as a `bplist00` document.
///
/// Objects are laid out in pre-order with the root at index 0. Shared subtrees are
/// written once per occurrence.
pub fn to_bytes(value: &Value) -> Vec<u8> {
	let mut nodes = Vec::new();
	flatten(value, &mut nodes);

	let object_count = nodes.len() as u64;
	let ref_width = width_for(object_count.saturating_sub(1));

	let mut out = Vec::with_capacity(64);
	out.extend_from_slice(BINARY_MAGIC);
	let mut offsets = Vec::with_capacity(nodes.len());
	for node in &nodes {
		offsets.push(out.len() as u64);
		write_node(&mut out, node, ref_width);
	}

	let offset_table_start = out.len() as u64;
	let offset_width = width_for(offset_table_start);
	for offset in offsets {
		push_uint(&mut out, offset, offset_width);
	}

	let trailer = Trailer {
		sort_version: 0,
		offset_width,
		ref_width,
		object_count,
		root_object: 0,
		offset_table_start,
	};
	write_trailer(&mut out, &trailer);
	out
}

/// Serialize a value tree as a `bplist00` document into `writer`.
pub fn write_binary<W: Write>(value: &Value, mut writer: W) -> Result<()> {
	writer.write_all(&to_bytes(value))?;
	Ok(())
}

fn flatten<'v>(value: &'v Value, nodes: &mut Vec<Node<'v>>) -> u64 {
	let index = nodes.len();
	match value {
		Value::Array(items) => {
			nodes.push(Node::Array(Vec::new()));
			let refs = items.iter().map(|item| flatten(item, nodes)).collect();
			nodes[index] = Node::Array(refs);
		}
		Value::Dictionary(dict) => {
			nodes.push(Node::Dictionary {
				keys: Vec::new(),
				values: Vec::new(),
			});
			let mut keys = Vec::with_capacity(dict.len());
			for key in dict.keys() {
				keys.push(nodes.len() as u64);
				nodes.push(Node::Key(key));
			}
			let values = dict.values().map(|item| flatten(item, nodes)).collect();
			nodes[index] = Node::Dictionary { keys, values };
		}
		_ => nodes.push(Node::Value(value)),
	}
	index as u64
}

fn write_node(out: &mut Vec<u8>, node: &Node<'_>, ref_width: u8) {
	match node {
		Node::Key(key) => write_string(out, key),
		Node::Array(refs) => {
			write_header(out, 0xA, refs.len());
			for index in refs {
				push_uint(out, *index, ref_width);
			}
		}
		Node::Dictionary { keys, values } => {
			write_header(out, 0xD, keys.len());
			for index in keys.iter().chain(values) {
				push_uint(out, *index, ref_width);
			}
		}
		Node::Value(value) => match value {
			Value::String(text) => write_string(out, text),
			Value::Integer(int) => write_integer(out, *int),
			Value::Real(real) => {
				out.push(0x23);
				out.extend_from_slice(&real.to_be_bytes());
			}
			Value::Boolean(flag) => out.push(if *flag { 0x09 } else { 0x08 }),
			Value::Date(date) => {
				out.push(0x33);
				out.extend_from_slice(&absolute_time_from_date(date).to_be_bytes());
			}
			Value::Data(bytes) => {
				write_header(out, 0x4, bytes.len());
				out.extend_from_slice(bytes);
			}
			Value::Uid(uid) => {
				let width = width_for(uid.get());
				out.push(Marker::compose(0x8, width - 1));
				push_uint(out, uid.get(), width);
			}
			// containers are flattened into their own nodes
			Value::Array(_) | Value::Dictionary(_) => {}
		},
	}
}

fn write_string(out: &mut Vec<u8>, text: &str) {
	if text.is_ascii() {
		write_header(out, 0x5, text.len());
		out.extend_from_slice(text.as_bytes());
	} else {
		let units: Vec<u16> = text.encode_utf16().collect();
		write_header(out, 0x6, units.len());
		for unit in units {
			out.extend_from_slice(&unit.to_be_bytes());
		}
	}
}

fn write_integer(out: &mut Vec<u8>, int: Integer) {
	match int {
		Integer::Signed(value) if value >= 0 => write_unsigned(out, value as u64),
		Integer::Signed(value) => {
			out.push(0x13);
			out.extend_from_slice(&value.to_be_bytes());
		}
		Integer::Unsigned(value) => {
			out.push(0x14);
			out.extend_from_slice(&value.to_be_bytes());
		}
	}
}

fn write_unsigned(out: &mut Vec<u8>, value: u64) {
	let width = width_for(value);
	let log2_width = match width {
		1 => 0,
		2 => 1,
		4 => 2,
		_ => 3,
	};
	out.push(Marker::compose(0x1, log2_width));
	push_uint(out, value, width);
}

fn write_header(out: &mut Vec<u8>, kind: u8, len: usize) {
	if len < usize::from(EXTENDED_LEN) {
		out.push(Marker::compose(kind, len as u8));
	} else {
		out.push(Marker::compose(kind, EXTENDED_LEN));
		write_unsigned(out, len as u64);
	}
}

fn write_trailer(out: &mut Vec<u8>, trailer: &Trailer) {
	out.extend_from_slice(&[0_u8; 5]);
	out.push(trailer.sort_version);
	out.push(trailer.offset_width);
	out.push(trailer.ref_width);
	out.extend_from_slice(&trailer.object_count.to_be_bytes());
	out.extend_from_slice(&trailer.root_object.to_be_bytes());
	out.extend_from_slice(&trailer.offset_table_start.to_be_bytes());
}

/// Smallest of 1, 2, 4, or 8 bytes that holds `value`.
fn width_for(value: u64) -> u8 {
	if value <= 0xFF {
		1
	} else if value <= 0xFFFF {
		2
	} else if value <= 0xFFFF_FFFF {
		4
	} else {
		8
	}
}

fn push_uint(out: &mut Vec<u8>, value: u64, width: u8) {
	let bytes = value.to_be_bytes();
	out.extend_from_slice(&bytes[8 - usize::from(width)..]);
}
