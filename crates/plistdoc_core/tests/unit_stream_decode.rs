#![allow(missing_docs)]

use std::io::Cursor;

use plistdoc::plist::{
	Blob, Decoder, Format, PlistError, ReadOptions, Value, parse_value_with, to_binary_bytes,
};
use plistdoc::plist_record;
use plistdoc_testkit::{BplistBuilder, xml_doc};

#[derive(Debug, Default, PartialEq)]
struct Entry {
	name: String,
	payload: Blob,
	hidden: bool,
}

plist_record!(Entry {
	name => "Name",
	payload => "Payload",
	hidden => "-",
});

fn entry_body(name: &str) -> String {
	format!(concat!(
		"<dict><key>Name</key><string>{name}</string>",
		"<key>Payload</key><data>AQID</data><key>hidden</key><true/></dict>"
	), name = name)
}

#[test]
fn decoder_reads_xml_documents_back_to_back() {
	let input = format!("{}\n\n{}", xml_doc(&entry_body("first")), xml_doc(&entry_body("second")));
	let mut decoder = Decoder::new(Cursor::new(input.into_bytes()));

	let first: Entry = decoder.decode().expect("first document");
	let second: Entry = decoder.decode().expect("second document");
	assert_eq!(first.name, "first");
	assert_eq!(second.name, "second");
	assert_eq!(&*first.payload, b"AQID");
	assert!(!first.hidden);

	assert!(matches!(decoder.decode::<Entry>(), Err(PlistError::EmptyInput)));
}

#[test]
fn decoder_reads_binary_documents() {
	let mut builder = BplistBuilder::new();
	let key = builder.ascii("Payload");
	let payload = builder.raw([0x43, 1, 2, 3]);
	let name_key = builder.ascii("Name");
	let name = builder.ascii("bin");
	let root = builder.dict(&[(key, payload), (name_key, name)]);

	let bytes = builder.build(root);
	let mut decoder = Decoder::with_options(bytes.as_slice(), ReadOptions::untrusted());
	let entry: Entry = decoder.decode().expect("binary document");
	assert_eq!(entry.name, "bin");
	assert_eq!(entry.payload, Blob(vec![1, 2, 3]));
}

#[test]
fn same_tree_from_either_format() {
	let options = ReadOptions::default();
	let xml = xml_doc(&entry_body("same"));
	let (xml_format, from_xml) = parse_value_with(xml.as_bytes(), &options).expect("xml parses");
	let bytes = to_binary_bytes(&from_xml);
	let (binary_format, from_binary) = parse_value_with(&bytes, &options).expect("binary parses");

	assert_eq!(xml_format, Format::Xml);
	assert_eq!(binary_format, Format::Binary);
	assert_eq!(from_xml, from_binary);
	assert_eq!(from_binary.get("Payload"), Some(&Value::Data(vec![1, 2, 3])));
}

#[test]
fn reader_errors_surface_as_io() {
	struct Broken;

	impl std::io::Read for Broken {
		fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
			Err(std::io::Error::other("disk on fire"))
		}
	}

	let err = Decoder::new(Broken).decode_value().expect_err("read fails");
	assert!(matches!(err, PlistError::Io(_)));
	assert_eq!(err.category(), plistdoc::plist::ErrorCategory::Io);
}
