//! Typed model of the search index envelope.
//!
//! The envelope is a single serialized object: an ordered document list,
//! token → postings maps for body and title terms, a titles table parallel
//! to the document list, and tool metadata stanzas that are carried through
//! opaquely. Document *positions* (indices into `docnames`) are the
//! identifiers used by every postings list.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Postings
// ---------------------------------------------------------------------------

/// The document positions containing a given token.
///
/// The wire encoding is a bare number for a single position and an array
/// otherwise; that distinction is preserved on re-serialization so a read →
/// write round trip is byte-faithful.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Postings(Vec<u32>);

impl Postings {
    /// The positions, in wire order.
    pub fn positions(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u32>> for Postings {
    fn from(positions: Vec<u32>) -> Self {
        Self(positions)
    }
}

impl<'a> IntoIterator for &'a Postings {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Postings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.len() == 1 {
            serializer.serialize_u32(self.0[0])
        } else {
            let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
            for pos in &self.0 {
                seq.serialize_element(pos)?;
            }
            seq.end()
        }
    }
}

impl<'de> Deserialize<'de> for Postings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(u32),
            Many(Vec<u32>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::One(pos) => Ok(Self(vec![pos])),
            Repr::Many(positions) => Ok(Self(positions)),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchIndex
// ---------------------------------------------------------------------------

/// The search index envelope, as written by the documentation generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    /// Document identifiers (paths without extension). Ordering defines the
    /// positions every postings list refers to.
    pub docnames: Vec<String>,

    /// Indexing-tool extension/version stanza. Opaque passthrough.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub envversion: serde_json::Value,

    /// Source file names, parallel to `docnames`.
    pub filenames: Vec<String>,

    /// Domain-object tables. Opaque passthrough.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub objects: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub objnames: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub objtypes: serde_json::Value,

    /// Body token → postings.
    pub terms: BTreeMap<String, Postings>,

    /// Display titles, parallel to `docnames`.
    pub titles: Vec<String>,

    /// Title token → postings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub titleterms: BTreeMap<String, Postings>,

    /// Any keys this tool does not know about, carried through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One document matched by a token lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermHit<'a> {
    /// Position in `docnames`.
    pub position: u32,
    /// The document identifier at that position.
    pub docname: &'a str,
    /// The display title at that position, when the titles table covers it.
    pub title: Option<&'a str>,
}

impl SearchIndex {
    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.docnames.len()
    }

    /// Resolve a body token to the documents containing it.
    ///
    /// Tokens are stored stemmed and lowercased by the generator, so the
    /// lookup is exact-match on the stored form. Returns `None` for an
    /// unknown token.
    pub fn docs_with_term(&self, token: &str) -> Option<Vec<TermHit<'_>>> {
        self.terms.get(token).map(|postings| self.resolve(postings))
    }

    /// Resolve a title token to the documents whose title contains it.
    pub fn docs_with_title_term(&self, token: &str) -> Option<Vec<TermHit<'_>>> {
        self.titleterms
            .get(token)
            .map(|postings| self.resolve(postings))
    }

    fn resolve(&self, postings: &Postings) -> Vec<TermHit<'_>> {
        postings
            .positions()
            .iter()
            .map(|&position| TermHit {
                position,
                docname: self
                    .docnames
                    .get(position as usize)
                    .map(String::as_str)
                    .unwrap_or(""),
                title: self.titles.get(position as usize).map(String::as_str),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> SearchIndex {
        serde_json::from_value(serde_json::json!({
            "docnames": ["content/getting-started", "content/weather-data"],
            "envversion": {"sphinx": 56, "sphinx.domains.std": 1},
            "filenames": ["content/getting-started.md", "content/weather-data.md"],
            "objects": {},
            "objnames": {},
            "objtypes": {},
            "terms": {"climat": [0, 1], "start": 0},
            "titles": ["Getting Started", "Weather Data"],
            "titleterms": {"weather": 1}
        }))
        .expect("deserialize sample index")
    }

    #[test]
    fn postings_accept_scalar_and_list() {
        let index = sample_index();
        assert_eq!(index.terms["climat"].positions(), &[0, 1]);
        assert_eq!(index.terms["start"].positions(), &[0]);
    }

    #[test]
    fn scalar_postings_roundtrip_as_scalars() {
        let index = sample_index();
        let json = serde_json::to_value(&index).expect("serialize");
        assert_eq!(json["terms"]["start"], serde_json::json!(0));
        assert_eq!(json["terms"]["climat"], serde_json::json!([0, 1]));
    }

    #[test]
    fn unknown_keys_roundtrip() {
        let mut value = serde_json::to_value(sample_index()).expect("serialize");
        value["alltitles"] = serde_json::json!({"Getting Started": [[0, null]]});

        let parsed: SearchIndex = serde_json::from_value(value.clone()).expect("deserialize");
        assert!(parsed.extra.contains_key("alltitles"));

        let reserialized = serde_json::to_value(&parsed).expect("reserialize");
        assert_eq!(reserialized["alltitles"], value["alltitles"]);
    }

    #[test]
    fn term_lookup_resolves_positions() {
        let index = sample_index();
        let hits = index.docs_with_term("climat").expect("term known");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].docname, "content/getting-started");
        assert_eq!(hits[1].title, Some("Weather Data"));

        assert!(index.docs_with_term("nonexistent").is_none());

        let title_hits = index.docs_with_title_term("weather").expect("title term");
        assert_eq!(title_hits[0].position, 1);
    }

    #[test]
    fn envversion_is_opaque() {
        let index = sample_index();
        assert_eq!(index.envversion["sphinx"], serde_json::json!(56));
        assert_eq!(index.envversion["sphinx.domains.std"], serde_json::json!(1));
    }
}
