//! Invariant validation for a loaded search index.
//!
//! The external search widget trusts the envelope's internal consistency:
//! the titles and filenames tables must parallel the document list, and
//! every postings position must reference a real document. A violation here
//! means the widget would render broken results, so it fails the verify
//! step.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use docpress_shared::{DocpressError, IndexSummary, Result};

use crate::envelope::{Postings, SearchIndex};
use crate::reader;

/// Check every structural invariant of the envelope.
///
/// Returns the first violation found, naming the offending table, token, or
/// position.
pub fn validate(index: &SearchIndex) -> Result<()> {
    let doc_count = index.docnames.len();

    if index.filenames.len() != doc_count {
        return Err(DocpressError::validation(format!(
            "filenames length {} does not match docnames length {doc_count}",
            index.filenames.len()
        )));
    }

    if index.titles.len() != doc_count {
        return Err(DocpressError::validation(format!(
            "titles length {} does not match docnames length {doc_count}",
            index.titles.len()
        )));
    }

    let mut seen = HashSet::with_capacity(doc_count);
    for docname in &index.docnames {
        if !seen.insert(docname.as_str()) {
            return Err(DocpressError::validation(format!(
                "duplicate docname '{docname}'"
            )));
        }
    }

    validate_postings_table(&index.terms, "terms", doc_count)?;
    validate_postings_table(&index.titleterms, "titleterms", doc_count)?;

    Ok(())
}

/// Counts for the build report.
pub fn summarize(index: &SearchIndex) -> IndexSummary {
    IndexSummary {
        document_count: index.docnames.len(),
        term_count: index.terms.len(),
        title_term_count: index.titleterms.len(),
    }
}

/// Load an index file, validate it, and return its summary.
pub fn validate_file(path: &Path) -> Result<IndexSummary> {
    let index = reader::load(path)?;
    validate(&index)?;
    Ok(summarize(&index))
}

fn validate_postings_table(
    table: &BTreeMap<String, Postings>,
    label: &str,
    doc_count: usize,
) -> Result<()> {
    for (token, postings) in table {
        if token.is_empty() {
            return Err(DocpressError::validation(format!(
                "{label} contains an empty token"
            )));
        }
        if postings.is_empty() {
            return Err(DocpressError::validation(format!(
                "{label} token '{token}' has an empty postings list"
            )));
        }
        for &position in postings {
            if position as usize >= doc_count {
                return Err(DocpressError::validation(format!(
                    "{label} token '{token}' references document position {position}, \
                     but only {doc_count} documents exist"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_index() -> SearchIndex {
        reader::load(Path::new("../../../fixtures/index/searchindex.fixture.js"))
            .expect("load fixture")
    }

    #[test]
    fn fixture_passes_validation() {
        let index = valid_index();
        validate(&index).expect("fixture is valid");

        let summary = summarize(&index);
        assert_eq!(summary.document_count, 5);
        assert_eq!(summary.term_count, 15);
        assert_eq!(summary.title_term_count, 8);
    }

    #[test]
    fn titles_length_mismatch_fails() {
        let mut index = valid_index();
        index.titles.pop();

        let err = validate(&index).unwrap_err();
        assert!(err.to_string().contains("titles length"));
    }

    #[test]
    fn filenames_length_mismatch_fails() {
        let mut index = valid_index();
        index.filenames.push("extra.md".into());

        let err = validate(&index).unwrap_err();
        assert!(err.to_string().contains("filenames length"));
    }

    #[test]
    fn out_of_range_posting_fails() {
        let mut index = valid_index();
        index.terms.insert("rogu".into(), vec![99].into());

        let err = validate(&index).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rogu"));
        assert!(msg.contains("99"));
    }

    #[test]
    fn out_of_range_title_posting_fails() {
        let mut index = valid_index();
        index.titleterms.insert("rogu".into(), vec![5].into());

        let err = validate(&index).unwrap_err();
        assert!(err.to_string().contains("titleterms"));
    }

    #[test]
    fn duplicate_docname_fails() {
        let mut index = valid_index();
        let first = index.docnames[0].clone();
        index.docnames.push(first.clone());
        index.filenames.push("dup.md".into());
        index.titles.push("Dup".into());

        let err = validate(&index).unwrap_err();
        assert!(err.to_string().contains(&first));
    }

    #[test]
    fn empty_postings_list_fails() {
        let mut index = valid_index();
        index.terms.insert("hollow".into(), Vec::new().into());

        let err = validate(&index).unwrap_err();
        assert!(err.to_string().contains("hollow"));
    }

    #[test]
    fn validate_file_reports_summary() {
        let summary =
            validate_file(Path::new("../../../fixtures/index/searchindex.fixture.js"))
                .expect("validate fixture");
        assert_eq!(summary.document_count, 5);
    }
}
