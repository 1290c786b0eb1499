//! Search index artifact handling.
//!
//! Documentation generators emit a full-text search index (`searchindex.js`)
//! consumed by a client-side search widget. This crate provides:
//! - [`SearchIndex`] — a typed model of the index envelope
//! - [`reader`] — read/write the `Search.setIndex({...})` wrapper format
//! - [`validate`] — invariant enforcement over a loaded index
//!
//! docpress treats the artifact strictly as a build output: it is read,
//! checked, and summarized — never authored or edited in place.

pub mod envelope;
pub mod reader;
pub mod validate;

pub use envelope::{Postings, SearchIndex, TermHit};
pub use reader::{from_js_str, from_json_str, load, to_js_string};
pub use validate::{summarize, validate, validate_file};
