//! Payload codecs.
//!
//! Only the text path needs decoding; binary payloads are read in place.

mod base64_stream;

pub use base64_stream::{DecodeReport, InvalidCharacter, decode, decode_with_report};
