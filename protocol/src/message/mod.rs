//! # Message Module
//!
//! The gateway speaks in flat `NAME=value` forms. This module holds the
//! closed vocabulary of field names ([`Field`]) and the ordered container
//! that carries one request or one response ([`FieldRecord`]).
//!
//! ```text
//! field.rs  — The Field enum: exact wire names, parsing, direction
//! record.rs — FieldRecord: ordered Field → String map, lenient ingest
//! ```

pub mod field;
pub mod record;

pub use field::Field;
pub use record::FieldRecord;
