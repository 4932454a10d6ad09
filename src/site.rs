//! Defines the [`Collection`] type: the full set of validated documents
//! for one build, plus the derived chronological and taxonomy indexes.
//! A `Collection` is assembled once per build and discarded with it; the
//! indexes are computed at assembly and never mutated independently.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::PathBuf,
};

use serde::Serialize;

use crate::document::Document;
use crate::source::DocumentId;

#[derive(Debug, Serialize)]
pub struct Collection {
    documents: Vec<Document>,
    by_tag: BTreeMap<String, Vec<DocumentId>>,
    by_category: BTreeMap<String, Vec<DocumentId>>,
}

impl Collection {
    /// Assembles a [`Collection`] from validated documents. Documents are
    /// ordered by descending publish date with ties broken by ascending
    /// identifier, which makes the ordering a total order: two builds over
    /// the same sources produce identical output regardless of how the
    /// documents were loaded. Fails if two documents resolve to the same
    /// identifier.
    pub fn assemble(mut documents: Vec<Document>) -> Result<Collection> {
        let mut seen: HashMap<DocumentId, PathBuf> = HashMap::with_capacity(documents.len());
        for document in &documents {
            if let Some(first) = seen.insert(document.id.clone(), document.source_path.clone()) {
                return Err(Error::DuplicateIdentifier {
                    id: document.id.clone(),
                    first,
                    second: document.source_path.clone(),
                });
            }
        }

        documents.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut by_tag: BTreeMap<String, Vec<DocumentId>> = BTreeMap::new();
        let mut by_category: BTreeMap<String, Vec<DocumentId>> = BTreeMap::new();
        for document in &documents {
            for tag in &document.tags {
                by_tag
                    .entry(tag.clone())
                    .or_default()
                    .push(document.id.clone());
            }
            for category in &document.categories {
                by_category
                    .entry(category.clone())
                    .or_default()
                    .push(document.id.clone());
            }
        }

        Ok(Collection {
            documents,
            by_tag,
            by_category,
        })
    }

    /// The documents in chronological order, most recent first.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document identifiers grouped by tag. Each group follows the
    /// chronological order of [`Collection::documents`].
    pub fn by_tag(&self) -> &BTreeMap<String, Vec<DocumentId>> {
        &self.by_tag
    }

    /// Document identifiers grouped by category. Each group follows the
    /// chronological order of [`Collection::documents`].
    pub fn by_category(&self) -> &BTreeMap<String, Vec<DocumentId>> {
        &self.by_category
    }
}

/// Represents the result of a fallible assembly operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error assembling a [`Collection`].
#[derive(Debug)]
pub enum Error {
    /// Returned when two source files resolve to the same identifier.
    /// Names both files so the author knows which ones collide.
    DuplicateIdentifier {
        id: DocumentId,
        first: PathBuf,
        second: PathBuf,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateIdentifier { id, first, second } => write!(
                f,
                "duplicate document identifier `{}`: `{}` and `{}` resolve to the same identifier",
                id,
                first.display(),
                second.display()
            ),
        }
    }
}

impl std::error::Error for Error {}
