use chrono::{TimeZone, Utc};
use plistdoc_testkit::BplistBuilder;

use crate::plist::{
	BinaryReader, Dictionary, Integer, Kind, PlistError, ReadOptions, Uid, Value, from_binary_bytes,
	from_binary_bytes_with, to_binary_bytes,
};

fn single(object: &[u8]) -> crate::plist::Result<Value> {
	let mut builder = BplistBuilder::new();
	let root = builder.raw(object.to_vec());
	from_binary_bytes(&builder.build(root))
}

#[test]
fn decodes_scalar_markers() {
	assert_eq!(single(&[0x08]).expect("false"), Value::Boolean(false));
	assert_eq!(single(&[0x09]).expect("true"), Value::Boolean(true));
	assert_eq!(single(&[0x10, 0xff]).expect("u8"), Value::Integer(Integer::Signed(255)));
	assert_eq!(single(&[0x11, 0x01, 0x00]).expect("u16"), Value::Integer(Integer::Signed(256)));
	assert_eq!(
		single(&[0x12, 0xff, 0xff, 0xff, 0xff]).expect("u32"),
		Value::Integer(Integer::Signed(0xffff_ffff))
	);
	assert_eq!(
		single(&[0x13, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).expect("i64"),
		Value::Integer(Integer::Signed(-1))
	);

	let mut wide = vec![0x14];
	wide.extend_from_slice(&u128::from(u64::MAX).wrapping_add(1).to_be_bytes());
	assert_eq!(
		single(&wide).expect("128-bit"),
		Value::Integer(Integer::Unsigned(u128::from(u64::MAX) + 1))
	);
}

#[test]
fn single_precision_reals_are_widened() {
	let mut object = vec![0x22];
	object.extend_from_slice(&1.5_f32.to_be_bytes());
	assert_eq!(single(&object).expect("f32"), Value::Real(1.5));

	let mut object = vec![0x23];
	object.extend_from_slice(&(-0.25_f64).to_be_bytes());
	assert_eq!(single(&object).expect("f64"), Value::Real(-0.25));
}

#[test]
fn dates_count_from_2001() {
	let mut object = vec![0x33];
	object.extend_from_slice(&0.0_f64.to_be_bytes());
	let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).single().expect("valid date");
	assert_eq!(single(&object).expect("date"), Value::Date(epoch));

	let mut object = vec![0x33];
	object.extend_from_slice(&f64::NAN.to_be_bytes());
	let err = single(&object).expect_err("nan date");
	assert!(matches!(err, PlistError::InvalidAbsoluteTime { .. }));
}

#[test]
fn decodes_strings_data_and_uids() {
	assert_eq!(single(&[0x43, 1, 2, 3]).expect("data"), Value::Data(vec![1, 2, 3]));
	assert_eq!(single(&[0x52, b'h', b'i']).expect("ascii"), Value::from("hi"));
	assert_eq!(single(&[0x62, 0x00, b'h', 0x00, 0xe9]).expect("utf16"), Value::from("h\u{e9}"));
	assert_eq!(single(&[0x80, 0x05]).expect("uid"), Value::Uid(Uid(5)));
	assert_eq!(single(&[0x81, 0x01, 0x00]).expect("wide uid"), Value::Uid(Uid(256)));
}

#[test]
fn extended_length_follows_marker() {
	let text = "abcdefghijklmnopqrst";
	let mut object = vec![0x5F, 0x10, text.len() as u8];
	object.extend_from_slice(text.as_bytes());
	assert_eq!(single(&object).expect("long ascii"), Value::from(text));

	let err = single(&[0x5F, 0x52, b'n', b'o']).expect_err("length is not an integer");
	assert!(matches!(err, PlistError::InvalidLength { .. }));
}

#[test]
fn rejects_unknown_and_malformed_markers() {
	let err = |object: &[u8]| single(object).expect_err("malformed object");
	assert!(matches!(err(&[0x00]), PlistError::UnknownMarker { marker: 0x00, .. }));
	assert!(matches!(err(&[0x0F]), PlistError::UnknownMarker { marker: 0x0F, .. }));
	assert!(matches!(err(&[0x70]), PlistError::UnknownMarker { marker: 0x70, .. }));
	assert!(matches!(err(&[0x15, 0]), PlistError::InvalidNumericWidth { marker: 0x15, .. }));
	assert!(matches!(err(&[0x21, 0, 0]), PlistError::InvalidNumericWidth { .. }));
	let wide_uid = [0x88, 0, 0, 0, 0, 0, 0, 0, 0, 1];
	assert!(matches!(err(&wide_uid), PlistError::UidTooWide { width: 9, .. }));
	assert!(matches!(err(&[0x61, 0xd8, 0x00]), PlistError::InvalidUtf16 { .. }));
}

#[test]
fn truncated_payload_is_an_eof_error() {
	// the payload may not run into the offset table
	let err = single(&[0x5A, b'a', b'b']).expect_err("short string");
	assert!(matches!(err, PlistError::UnexpectedEof { .. }));
	assert!(err.is_malformed());
}

#[test]
fn decodes_containers_in_order() {
	let mut builder = BplistBuilder::new();
	let name_key = builder.ascii("name");
	let name = builder.ascii("demo");
	let count_key = builder.ascii("count");
	let one = builder.int(1);
	let two = builder.int(2);
	let list = builder.array(&[one, two]);
	let root = builder.dict(&[(name_key, name), (count_key, list)]);

	let value = from_binary_bytes(&builder.build(root)).expect("document parses");
	let mut expected = Dictionary::new();
	expected.insert("name".to_owned(), Value::from("demo"));
	expected.insert("count".to_owned(), Value::Array(vec![Value::from(1_i64), Value::from(2_i64)]));
	assert_eq!(value, Value::Dictionary(expected));

	let keys: Vec<_> = value.as_dictionary().expect("dictionary").keys().cloned().collect();
	assert_eq!(keys, ["name", "count"]);
}

#[test]
fn shared_objects_are_decoded_for_every_reference() {
	let mut builder = BplistBuilder::new();
	let shared = builder.ascii("same");
	let inner = builder.array(&[shared]);
	let root = builder.array(&[inner, inner, shared]);

	let value = from_binary_bytes(&builder.build(root)).expect("document parses");
	let inner = Value::Array(vec![Value::from("same")]);
	assert_eq!(value, Value::Array(vec![inner.clone(), inner, Value::from("same")]));
}

#[test]
fn self_reference_is_a_cycle() {
	let mut builder = BplistBuilder::new();
	let root = builder.raw([0xA1, 0x00]);

	let err = from_binary_bytes(&builder.build(root)).expect_err("cycle");
	assert!(matches!(err, PlistError::Cycle { index: 0 }));
}

#[test]
fn depth_limit_is_enforced() {
	let mut builder = BplistBuilder::new();
	let leaf = builder.array(&[]);
	let middle = builder.array(&[leaf]);
	let root = builder.array(&[middle]);
	let bytes = builder.build(root);

	let shallow = ReadOptions {
		max_depth: 1,
		..ReadOptions::default()
	};
	let err = from_binary_bytes_with(&bytes, shallow).expect_err("too deep");
	assert!(matches!(err, PlistError::DepthExceeded { max_depth: 1 }));

	let enough = ReadOptions {
		max_depth: 2,
		..ReadOptions::default()
	};
	from_binary_bytes_with(&bytes, enough).expect("fits the limit");
}

#[test]
fn shared_subtrees_count_against_the_node_budget() {
	let mut builder = BplistBuilder::new();
	let shared = builder.ascii("same");
	let inner = builder.array(&[shared]);
	let root = builder.array(&[inner, inner, shared]);
	let bytes = builder.build(root);

	let budget = |max_nodes| ReadOptions {
		max_nodes,
		..ReadOptions::default()
	};
	from_binary_bytes_with(&bytes, budget(6)).expect("six expanded nodes fit");
	let err = from_binary_bytes_with(&bytes, budget(5)).expect_err("one node over");
	assert!(matches!(err, PlistError::NodeLimitExceeded { max_nodes: 5 }));
	assert!(err.is_malformed());
}

#[test]
fn doubling_reference_chain_is_cut_off() {
	// each level references the previous one twice, so 40 levels expand to 2^41 nodes
	let mut builder = BplistBuilder::new();
	let mut previous = builder.int(0);
	for _ in 0..40 {
		previous = builder.array(&[previous, previous]);
	}
	let bytes = builder.build(previous);

	let err = from_binary_bytes(&bytes).expect_err("exponential expansion");
	assert!(matches!(err, PlistError::NodeLimitExceeded { .. }));
	let err =
		from_binary_bytes_with(&bytes, ReadOptions::untrusted()).expect_err("untrusted budget");
	assert!(matches!(err, PlistError::NodeLimitExceeded { max_nodes: 65_536 }));
}

#[test]
fn non_string_dictionary_key_is_rejected() {
	let mut builder = BplistBuilder::new();
	let key = builder.int(3);
	let value = builder.ascii("v");
	let root = builder.dict(&[(key, value)]);

	let err = from_binary_bytes(&builder.build(root)).expect_err("integer key");
	assert!(matches!(err, PlistError::InvalidDictionaryKey { index: 0, found: Kind::Integer }));
}

#[test]
fn out_of_range_references_are_malformed() {
	let mut builder = BplistBuilder::new();
	let root = builder.raw([0xA1, 0x09]);
	let err = from_binary_bytes(&builder.build(root)).expect_err("dangling reference");
	assert!(matches!(err, PlistError::ObjectIndexOutOfRange { index: 9, count: 1 }));

	let mut builder = BplistBuilder::new();
	let root = builder.int(1);
	let bytes = builder.build_with(root, |t| t.root = 4);
	let err = from_binary_bytes(&bytes).expect_err("dangling root");
	assert!(matches!(err, PlistError::ObjectIndexOutOfRange { index: 4, .. }));
	assert!(err.is_malformed());
}

#[test]
fn offset_past_object_area_is_malformed() {
	let mut builder = BplistBuilder::new();
	let root = builder.int(1);
	let mut bytes = builder.build(root);
	let table = bytes.len() - 32 - 2;
	bytes[table..table + 2].copy_from_slice(&[0xff, 0xff]);

	let err = from_binary_bytes(&bytes).expect_err("offset past end");
	assert!(matches!(err, PlistError::OffsetOutOfRange { index: 0, offset: 0xffff, .. }));
	assert!(err.is_malformed());
}

#[test]
fn offset_table_must_fit_before_trailer() {
	let mut builder = BplistBuilder::new();
	let root = builder.int(1);

	let bytes = builder.build_with(root, |t| t.object_count = 100);
	let err = from_binary_bytes(&bytes).expect_err("table too long");
	assert!(matches!(err, PlistError::OffsetTableOutOfRange { count: 100, .. }));

	let bytes = builder.build_with(root, |t| t.offset_table_start = 2);
	let err = from_binary_bytes(&bytes).expect_err("table in header");
	assert!(matches!(err, PlistError::OffsetTableOutOfRange { start: 2, .. }));

	let bytes = builder.build_with(root, |t| t.object_count = u64::MAX);
	let err = from_binary_bytes(&bytes).expect_err("overflow");
	assert!(matches!(err, PlistError::OffsetTableOutOfRange { .. }));
}

#[test]
fn reader_exposes_objects_by_index() {
	let mut builder = BplistBuilder::new();
	let first = builder.ascii("a");
	let second = builder.ascii("b");
	let root = builder.array(&[first, second]);
	let bytes = builder.build(root);

	let mut reader = BinaryReader::new(&bytes, ReadOptions::untrusted()).expect("reader opens");
	assert_eq!(reader.object_count(), 3);
	assert_eq!(reader.trailer().root_object, 2);
	assert_eq!(reader.object_offset(0).expect("offset"), 8);
	assert_eq!(reader.read_object(1).expect("object"), Value::from("b"));
	assert_eq!(
		reader.read_root().expect("root"),
		Value::Array(vec![Value::from("a"), Value::from("b")])
	);
}

#[test]
fn writer_output_reads_back() {
	let date = Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 0).single().expect("valid date");
	let mut nested = Dictionary::new();
	nested.insert("uid".to_owned(), Value::Uid(Uid(70_000)));
	nested.insert("blob".to_owned(), Value::Data(vec![0; 40]));

	let mut root = Dictionary::new();
	root.insert("title".to_owned(), Value::from("caf\u{e9} \u{1f600}"));
	root.insert("ascii".to_owned(), Value::from("x".repeat(20)));
	root.insert("negative".to_owned(), Value::from(-12_i64));
	root.insert("huge".to_owned(), Value::Integer(Integer::Unsigned(u128::from(u64::MAX) * 4)));
	root.insert("ratio".to_owned(), Value::Real(0.125));
	let flags = vec![Value::Boolean(true), Value::Boolean(false)];
	root.insert("flags".to_owned(), Value::Array(flags));
	root.insert("when".to_owned(), Value::Date(date));
	root.insert("nested".to_owned(), Value::Dictionary(nested));
	root.insert("empty".to_owned(), Value::Array(Vec::new()));
	let root = Value::Dictionary(root);

	let bytes = to_binary_bytes(&root);
	assert!(bytes.starts_with(b"bplist00"));
	assert_eq!(from_binary_bytes(&bytes).expect("writer output parses"), root);
}
