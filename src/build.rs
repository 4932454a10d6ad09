//! Exports the [`build_site`] function which stitches together the
//! pipeline stages: discovering and splitting source files
//! ([`crate::source`]), validating their front matter
//! ([`crate::document`]), assembling the collection and its indexes
//! ([`crate::site`]), and emitting the render plan ([`crate::plan`]).
//! Any stage failure aborts the whole build; a static site has no
//! meaningful partial-success state, so nothing is produced on error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use crate::config::Config;
use crate::document::{self, Document};
use crate::plan::{self, render_plan, RenderPlan};
use crate::site::{self, Collection};
use crate::source::{self, Loader, RawDocument};

/// The finished output of one build: the assembled [`Collection`] and the
/// [`RenderPlan`] an external renderer consumes. Discarded when the build
/// ends; nothing persists across builds.
#[derive(Debug, serde::Serialize)]
pub struct Site {
    pub collection: Collection,
    pub plan: RenderPlan,
}

/// Builds the [`Site`] for a [`Config`]: loads and validates every source
/// document, assembles the [`Collection`], and emits the [`RenderPlan`].
pub fn build_site(config: &Config) -> Result<Site> {
    let documents = load_documents(&config.source_directory, config.threads)?;
    info!(count = documents.len(), "validated source documents");

    let collection = Collection::assemble(documents)?;
    let plan = render_plan(&collection, config)?;
    info!(pages = plan.pages.len(), "assembled render plan");

    Ok(Site { collection, plan })
}

/// Loads and validates every source document under `source_directory`,
/// fanning out across `threads` workers when more than one is requested.
/// Results are sorted by identifier before they are returned, so the
/// ordering handed to assembly never depends on thread scheduling.
pub fn load_documents(source_directory: &Path, threads: usize) -> Result<Vec<Document>> {
    let mut documents = if threads < 2 {
        load_sequential(source_directory)?
    } else {
        load_parallel(source_directory, threads)?
    };
    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}

fn load_sequential(source_directory: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for raw in Loader::new(source_directory).scan() {
        documents.push(validate(raw?)?);
    }
    Ok(documents)
}

fn load_parallel(source_directory: &Path, threads: usize) -> Result<Vec<Document>> {
    let (tx, rx) = crossbeam_channel::unbounded::<PathBuf>();
    let mut workers = Vec::with_capacity(threads);

    for _ in 0..threads {
        let rx = rx.clone();
        workers.push(thread::spawn(move || -> Result<Vec<Document>> {
            let mut documents = Vec::new();
            for path in rx {
                documents.push(validate(source::load_path(&path)?)?);
            }
            Ok(documents)
        }));
    }

    for path in Loader::new(source_directory).files() {
        // A send only fails once every worker has exited early; whatever
        // error stopped them surfaces from the joins below.
        if tx.send(path?).is_err() {
            break;
        }
    }
    drop(tx);

    let mut documents = Vec::new();
    for worker in workers {
        documents.extend(worker.join().unwrap()?);
    }
    Ok(documents)
}

fn validate(raw: RawDocument) -> Result<Document> {
    debug!(path = %raw.source_path.display(), "validating document");
    let path = raw.source_path.clone();
    document::validate(raw).map_err(|err| Error::Document { path, err })
}

/// Represents the result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from source
/// discovery, front-matter validation, collection assembly, or planning.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors discovering or splitting source files.
    Source(source::Error),

    /// Returned when a source file's front matter fails validation.
    /// Carries the file's path so the author knows which document to fix.
    Document {
        path: PathBuf,
        err: document::Error,
    },

    /// Returned for errors assembling the collection.
    Assemble(site::Error),

    /// Returned for errors constructing the render plan.
    Plan(plan::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Source(err) => err.fmt(f),
            Error::Document { path, err } => write!(f, "`{}`: {}", path.display(), err),
            Error::Assemble(err) => err.fmt(f),
            Error::Plan(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::Document { path: _, err } => Some(err),
            Error::Assemble(err) => Some(err),
            Error::Plan(err) => Some(err),
        }
    }
}

impl From<source::Error> for Error {
    /// Converts [`source::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}

impl From<site::Error> for Error {
    /// Converts [`site::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: site::Error) -> Error {
        Error::Assemble(err)
    }
}

impl From<plan::Error> for Error {
    /// Converts [`plan::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: plan::Error) -> Error {
        Error::Plan(err)
    }
}
