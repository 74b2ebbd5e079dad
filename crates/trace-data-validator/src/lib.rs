//! trace-data-validator - structural comparison of decoded trace dumps.
//!
//! A trace dump is a JSON array of entries, each either packet metadata
//! (`packet-header`/`packet-context`) or an event (`header`,
//! `stream-context`, `context`, `payload`). Field values are decoded into
//! [`Field`] trees where `null` acts as a wildcard, and two dumps match when
//! their events pair up one to one under equal packet metadata.
//!
//! ```
//! use serde_json::json;
//! use trace_data_validator::{compare, decode_records};
//!
//! let expected = decode_records(&json!([{"header": null}])).unwrap();
//! let output = decode_records(&json!([{"header": {"type": "integer", "value": 99}}])).unwrap();
//! assert!(compare(&expected, &output));
//! ```

pub mod codec;
pub mod compare;
pub mod error;
pub mod field;
pub mod record;
pub mod validate;

pub use codec::{classify, decode_field, decode_records, encode_field, encode_record};
pub use compare::{compare, find_mismatch, EventCursor, Mismatch, MismatchKind};
pub use error::{DecodeError, Side, ValidateError};
pub use field::{equal, Field};
pub use record::{Event, PacketInfo, Record};
pub use validate::{validate_files, validate_str, validate_values, Verdict};
