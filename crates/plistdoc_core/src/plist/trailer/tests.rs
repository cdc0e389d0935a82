use plistdoc_testkit::BplistBuilder;

use crate::plist::{PlistError, Trailer};

#[test]
fn parses_builder_trailer() {
	let mut builder = BplistBuilder::new();
	let one = builder.int(1);
	let root = builder.array(&[one]);
	let bytes = builder.build(root);

	let trailer = Trailer::parse(&bytes).expect("trailer parses");
	assert_eq!(trailer.offset_width, 2);
	assert_eq!(trailer.ref_width, 1);
	assert_eq!(trailer.object_count, 2);
	assert_eq!(trailer.root_object, 1);
	assert_eq!(trailer.offset_table_start, 8 + 2 + 2);
	assert_eq!(Trailer::start_in(bytes.len()), bytes.len() - Trailer::SIZE);
}

#[test]
fn short_buffer_is_rejected() {
	let err = Trailer::parse(b"bplist00").expect_err("too short");
	assert!(matches!(err, PlistError::TooShort { len: 8, min: 40 }));
	assert!(err.is_malformed());
}

#[test]
fn bad_magic_is_rejected() {
	let mut builder = BplistBuilder::new();
	let root = builder.int(7);
	let mut bytes = builder.build(root);
	bytes[7] = b'1';

	let err = Trailer::parse(&bytes).expect_err("magic mismatch");
	assert!(matches!(err, PlistError::BadMagic { magic } if &magic == b"bplist01"));
}

#[test]
fn zero_and_oversized_widths_are_rejected() {
	let mut builder = BplistBuilder::new();
	let root = builder.int(7);

	let bytes = builder.build_with(root, |t| t.offset_width = 0);
	let err = Trailer::parse(&bytes).expect_err("zero offset width");
	assert!(matches!(err, PlistError::InvalidTrailerWidth { field: "offset", width: 0 }));

	let bytes = builder.build_with(root, |t| t.ref_width = 9);
	let err = Trailer::parse(&bytes).expect_err("oversized ref width");
	assert!(matches!(err, PlistError::InvalidTrailerWidth { width: 9, .. }));
}
