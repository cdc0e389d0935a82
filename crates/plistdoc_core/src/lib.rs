//! Property list codec for Apple's XML and `bplist00` formats.
//!
//! Documents parse into a [`plist::Value`] tree, which can then be decoded into typed
//! targets through [`plist::Decode`]. Record types declare their field tables with
//! [`plist_record!`].

/// Value model, binary and XML readers, binary writer, and typed decoding.
pub mod plist;
