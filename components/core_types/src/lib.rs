//! Core value types and error handling for the list runtime.
//!
//! This crate provides the foundational types shared by the collector and
//! its mutators: the tagged value representation and the error taxonomy.
//!
//! # Overview
//!
//! - [`Value`] - A heap reference or an immediate small integer
//! - [`Address`] - Word offset of a cell inside the semispaces
//! - [`Word`] - Raw tagged word as stored in a heap slot
//! - [`GcError`] - Fatal collector errors
//! - [`ErrorKind`] - Classification of those errors
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, GcError, ErrorKind};
//!
//! let n = Value::integer(42);
//! assert_eq!(n.decode().unwrap(), 42);
//!
//! let err = Value::NIL.decode().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TypeContractViolation);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, GcError};
pub use value::{
    Address, Value, Word, CELL_WORDS, SMALL_INT_MAX, SMALL_INT_MIN, TAG_BITS,
};
