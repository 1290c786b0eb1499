//! Reading and writing the `Search.setIndex({...})` wrapper format.
//!
//! Generators ship the index as a JavaScript file that assigns the envelope
//! into a global search registry:
//!
//! ```text
//! Search.setIndex({docnames:["..."],envversion:{"sphinx.domains.c":2,sphinx:56},...})
//! ```
//!
//! The object literal uses unquoted keys wherever they are legal JavaScript
//! identifiers and quoted keys elsewhere, so it is not strict JSON. The
//! reader peels the wrapper, quotes bare identifier keys, and hands the
//! result to `serde_json`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docpress_shared::{DocpressError, Result};

use crate::envelope::SearchIndex;

/// Matches the full wrapper and captures the object literal inside.
static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*Search\.setIndex\((.*)\)\s*;?\s*$").expect("wrapper regex")
});

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse an index from the JavaScript wrapper form.
pub fn from_js_str(src: &str) -> Result<SearchIndex> {
    let caps = WRAPPER_RE.captures(src).ok_or_else(|| {
        DocpressError::parse("expected a `Search.setIndex(...)` wrapper around the index object")
    })?;

    let body = caps.get(1).expect("capture group 1").as_str();
    let normalized = quote_bare_keys(body);
    debug!(
        raw_len = body.len(),
        normalized_len = normalized.len(),
        "normalized index object literal"
    );

    from_json_str(&normalized)
}

/// Parse an index from a strict JSON object.
pub fn from_json_str(src: &str) -> Result<SearchIndex> {
    serde_json::from_str(src)
        .map_err(|e| DocpressError::parse(format!("invalid search index object: {e}")))
}

/// Load an index from disk, dispatching on the file extension: `.json` is
/// parsed directly, everything else goes through the JavaScript wrapper
/// reader.
pub fn load(path: &Path) -> Result<SearchIndex> {
    let content = std::fs::read_to_string(path).map_err(|e| DocpressError::io(path, e))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json_str(&content),
        _ => from_js_str(&content),
    }
}

/// Re-emit the wrapper form from a model.
///
/// Output is strict JSON inside the wrapper; quoted keys are valid
/// JavaScript, so consumers parse it identically.
pub fn to_js_string(index: &SearchIndex) -> Result<String> {
    let body = serde_json::to_string(index)
        .map_err(|e| DocpressError::parse(format!("failed to serialize index: {e}")))?;
    Ok(format!("Search.setIndex({body})"))
}

// ---------------------------------------------------------------------------
// Key normalization
// ---------------------------------------------------------------------------

/// Quote bare identifier keys so the object literal becomes strict JSON.
///
/// A bare identifier followed (modulo whitespace) by `:` is a key; anything
/// inside a double-quoted string is left untouched. Values in generator
/// output are numbers, strings, arrays, and objects, so no bare identifier
/// can appear in value position followed by `:`.
fn quote_bare_keys(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 64);
    let mut chars = input.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some((i, c)) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                // Collect the full identifier.
                let mut end = i + c.len_utf8();
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' || d == '$' {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let ident = &input[i..end];

                // Key position iff the next significant char is ':'.
                let is_key = input[end..]
                    .chars()
                    .find(|d| !d.is_whitespace())
                    .is_some_and(|d| d == ':');

                if is_key {
                    out.push('"');
                    out.push_str(ident);
                    out.push('"');
                } else {
                    out.push_str(ident);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
