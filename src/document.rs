//! Defines the [`Document`] type and the front-matter validator that
//! produces it. Validation works field by field over the parsed YAML
//! mapping rather than through a derived struct, so a missing or
//! wrong-typed field is reported by name instead of as a generic
//! deserialization failure. The transformation is pure: no I/O, no state.

use std::{collections::BTreeSet, fmt, path::PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::source::{DocumentId, RawDocument};

/// A validated, normalized document. Every `Document` has a unique
/// identifier within its build, a non-empty title, and a valid publish
/// date; the body is carried along as opaque text.
#[derive(Clone, Debug, Serialize)]
pub struct Document {
    pub id: DocumentId,

    /// The source file the document came from, kept for error context and
    /// provenance.
    pub source_path: PathBuf,

    /// The front-matter `date` when present, otherwise the date encoded in
    /// the file name.
    pub publish_date: NaiveDate,

    pub title: String,

    /// Slugified category names. Order is irrelevant, hence a set.
    pub categories: BTreeSet<String>,

    /// Slugified tag names, duplicates removed, first-occurrence order
    /// preserved.
    pub tags: Vec<String>,

    /// Whether the rendered page should carry a comment section. Defaults
    /// to `true` when the front matter says nothing.
    pub comments_enabled: bool,

    /// The document body. Opaque to the pipeline.
    pub body: String,
}

/// Validates a [`RawDocument`]'s front matter and produces a [`Document`].
///
/// * `title` is required and must be a non-empty string.
/// * `date`, when present, must be a parseable date and overrides the
///   file-name date.
/// * `tags` and `categories` accept a single string or a sequence of
///   strings; absent means empty.
/// * `comments` must be a boolean; absent means `true`.
/// * Unknown keys (`layout`, `permalink`, ...) are ignored.
pub fn validate(raw: RawDocument) -> Result<Document> {
    let mapping = parse_mapping(&raw.front_matter)?;

    let title = match field(&mapping, "title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title.trim().to_owned(),
        _ => return Err(Error::Validation { field: "title" }),
    };

    let publish_date = match field(&mapping, "date") {
        None | Some(Value::Null) => raw.id.date,
        Some(Value::String(date)) => {
            parse_date(date).ok_or(Error::Validation { field: "date" })?
        }
        Some(_) => return Err(Error::Validation { field: "date" }),
    };

    let comments_enabled = match field(&mapping, "comments") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(enabled)) => *enabled,
        Some(_) => return Err(Error::Validation { field: "comments" }),
    };

    let mut tags = Vec::new();
    for tag in strings(&mapping, "tags")? {
        let tag = slug::slugify(tag);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let categories = strings(&mapping, "categories")?
        .iter()
        .map(slug::slugify)
        .filter(|category| !category.is_empty())
        .collect();

    Ok(Document {
        id: raw.id,
        source_path: raw.source_path,
        publish_date,
        title,
        categories,
        tags,
        comments_enabled,
        body: raw.body,
    })
}

fn parse_mapping(front_matter: &str) -> Result<Mapping> {
    if front_matter.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str(front_matter)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::NotAMapping),
    }
}

fn field<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(&Value::String(key.to_owned()))
}

/// Reads an optional field that accepts either a single string or a
/// sequence of strings, the two spellings these headers allow.
fn strings(mapping: &Mapping, key: &'static str) -> Result<Vec<String>> {
    match field(mapping, key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(value)) => Ok(vec![value.clone()]),
        Some(Value::Sequence(values)) => values
            .iter()
            .map(|value| match value {
                Value::String(value) => Ok(value.clone()),
                _ => Err(Error::Validation { field: key }),
            })
            .collect(),
        Some(_) => Err(Error::Validation { field: key }),
    }
}

/// Parses the `date` field. Accepts a bare date, a date-time, or a
/// date-time with a UTC offset, the spellings these headers use in the
/// wild. Only the calendar date is kept.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date_time) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(date_time.naive_local().date());
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(date_time.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Represents the result of a fallible validation operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error validating a document's front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when a required front-matter field is missing or has the
    /// wrong shape. `field` names the offending key.
    Validation { field: &'static str },

    /// Returned when the front-matter block is valid YAML but not a
    /// key/value mapping.
    NotAMapping,

    /// Returned when the front-matter block is not valid YAML.
    Yaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Validation { field } => {
                write!(f, "missing or invalid front-matter field `{}`", field)
            }
            Error::NotAMapping => {
                write!(f, "front matter is not a key/value mapping")
            }
            Error::Yaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation { .. } => None,
            Error::NotAMapping => None,
            Error::Yaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us
    /// to use the `?` operator for front-matter deserialization.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}
