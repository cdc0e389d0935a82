#![allow(missing_docs)]

use plistdoc::plist::parse_value;
use plistdoc_testkit::xml_doc;
use serde_json::json;

#[test]
fn value_tree_serializes_to_json() {
	let body = r#"<dict>
		<key>name</key><string>demo</string>
		<key>count</key><integer>3</integer>
		<key>ratio</key><real>0.5</real>
		<key>enabled</key><true/>
		<key>when</key><date>2015-09-05T21:55:30Z</date>
		<key>blob</key><data>AQID</data>
		<key>items</key><array><integer>-1</integer></array>
	</dict>"#;
	let tree = parse_value(xml_doc(body).as_bytes()).expect("xml parses");

	let json = serde_json::to_value(&tree).expect("serializes");
	assert_eq!(
		json,
		json!({
			"name": "demo",
			"count": 3,
			"ratio": 0.5,
			"enabled": true,
			"when": "2015-09-05T21:55:30+00:00",
			"blob": [1, 2, 3],
			"items": [-1],
		})
	);
}

#[test]
fn dictionary_order_is_kept_in_text_output() {
	let body = "<dict><key>z</key><integer>1</integer><key>a</key><integer>2</integer></dict>";
	let tree = parse_value(xml_doc(body).as_bytes()).expect("xml parses");
	assert_eq!(serde_json::to_string(&tree).expect("serializes"), r#"{"z":1,"a":2}"#);
}

#[test]
fn uids_serialize_as_keyed_archiver_references() {
	let tree = plistdoc::plist::Value::Uid(plistdoc::plist::Uid(12));
	assert_eq!(serde_json::to_value(&tree).expect("serializes"), json!({ "CF$UID": 12 }));
}
