//! Defines the [`DocumentId`], [`RawDocument`], and [`Loader`] types, plus
//! the logic for discovering source files and splitting each one into a
//! front-matter block and a body. Nothing here looks inside the front
//! matter; interpreting it is the job of [`crate::document`].

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use walkdir::WalkDir;

/// The fence delimiting the front-matter block at the top of a source file.
const FENCE: &str = "---";

/// The file extensions recognized as document sources.
const SOURCE_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Identifies a document within a build. Derived from the source file name
/// (`YYYY-MM-DD-slug.md`) and displayed as `YYYY-MM-DD-slug`. The derived
/// `Ord` over (date, slug) matches lexicographic order of the display form
/// because the date segment is fixed-width.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId {
    /// The calendar date encoded in the file name.
    pub date: NaiveDate,

    /// The slug portion of the file name. This is slugified so file names
    /// that differ only in case or separators resolve to the same
    /// identifier.
    pub slug: String,
}

impl DocumentId {
    /// Parses an identifier from a file stem of the form `YYYY-MM-DD-slug`.
    /// Returns `None` when the stem has no parseable date or no slug.
    fn from_file_stem(stem: &str) -> Option<DocumentId> {
        let date = NaiveDate::parse_from_str(stem.get(..10)?, "%Y-%m-%d").ok()?;
        let slug = slug::slugify(stem.get(10..)?.strip_prefix('-')?);
        if slug.is_empty() {
            return None;
        }
        Some(DocumentId { date, slug })
    }
}

impl fmt::Display for DocumentId {
    /// Displays a [`DocumentId`] as `YYYY-MM-DD-slug`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.slug)
    }
}

impl Serialize for DocumentId {
    /// Serializes a [`DocumentId`] in its display form.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The raw (front matter, body) split of one source file, before any
/// validation has happened.
#[derive(Clone, Debug)]
pub struct RawDocument {
    pub id: DocumentId,
    pub source_path: PathBuf,
    pub front_matter: String,
    pub body: String,
}

/// Reads and splits a single source file. The identifier comes from the
/// file name; the front matter and body come from the file contents. Each
/// source file must be structured as follows:
///
/// 1. Initial front-matter fence (`---`)
/// 2. YAML front matter with fields `title`, `date`, and optionally
///    `categories`, `tags`, and `comments`
/// 3. Terminal front-matter fence (`---`)
/// 4. Document body
///
/// For example:
///
/// ```md
/// ---
/// title: Hello, world!
/// date: 2021-04-16
/// tags: [greet]
/// ---
/// # Hello
///
/// World
/// ```
pub fn load_path(path: &Path) -> Result<RawDocument> {
    let id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(DocumentId::from_file_stem)
        .ok_or_else(|| Error::MissingIdentifier {
            path: path.to_owned(),
        })?;

    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;

    let (front_matter, body) =
        split_front_matter(&contents).ok_or_else(|| Error::MalformedDocument {
            path: path.to_owned(),
        })?;

    Ok(RawDocument {
        id,
        source_path: path.to_owned(),
        front_matter: front_matter.to_owned(),
        body: body.to_owned(),
    })
}

/// Splits a source file's contents at the front-matter fences. Returns
/// `None` when either fence is missing.
fn split_front_matter(input: &str) -> Option<(&str, &str)> {
    if !input.starts_with(FENCE) {
        return None;
    }
    let offset = input[FENCE.len()..].find(FENCE)?;
    let yaml_stop = FENCE.len() + offset;
    Some((&input[FENCE.len()..yaml_stop], &input[yaml_stop + FENCE.len()..]))
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| SOURCE_EXTENSIONS.contains(&extension))
        .unwrap_or(false)
}

/// Discovers document source files under a directory. Each call to
/// [`Loader::scan`] or [`Loader::files`] restarts discovery from scratch;
/// the loader keeps no state between runs and never writes anything.
pub struct Loader<'a> {
    source_directory: &'a Path,
}

impl<'a> Loader<'a> {
    /// Constructs a loader over `source_directory`.
    pub fn new(source_directory: &'a Path) -> Loader<'a> {
        Loader { source_directory }
    }

    /// Returns a lazy iterator over the discovered source file paths, in
    /// file-name order so discovery is deterministic across platforms.
    pub fn files(&self) -> Files {
        Files {
            entries: WalkDir::new(self.source_directory)
                .sort_by_file_name()
                .into_iter(),
        }
    }

    /// Returns a lazy iterator over raw (front matter, body) pairs, one
    /// per discovered source file.
    pub fn scan(&self) -> impl Iterator<Item = Result<RawDocument>> {
        self.files()
            .map(|result| result.and_then(|path| load_path(&path)))
    }
}

/// Iterator over discovered source file paths. See [`Loader::files`].
pub struct Files {
    entries: walkdir::IntoIter,
}

impl Iterator for Files {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.entries.next()? {
                Err(err) => return Some(Err(Error::Walk(err))),
                Ok(entry) => {
                    if entry.file_type().is_file() && is_source_file(entry.path()) {
                        return Some(Ok(entry.into_path()));
                    }
                }
            }
        }
    }
}

/// Represents the result of a fallible load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error discovering or splitting a source document.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file has no front-matter block delimiter.
    MalformedDocument { path: PathBuf },

    /// Returned when a source file name does not encode a date and slug.
    MissingIdentifier { path: PathBuf },

    /// Returned for directory-traversal errors.
    Walk(walkdir::Error),

    /// Returned for I/O errors reading a source file.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedDocument { path } => write!(
                f,
                "`{}`: no front-matter delimiter (`{}`) found",
                path.display(),
                FENCE
            ),
            Error::MissingIdentifier { path } => write!(
                f,
                "`{}`: file name does not encode a `YYYY-MM-DD-slug` identifier",
                path.display()
            ),
            Error::Walk(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "`{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedDocument { .. } => None,
            Error::MissingIdentifier { .. } => None,
            Error::Walk(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for directory traversal.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_document_id_from_file_stem() {
        let id = DocumentId::from_file_stem("2015-08-24-Welcome_Post").unwrap();
        assert_eq!(id.date, NaiveDate::from_ymd_opt(2015, 8, 24).unwrap());
        assert_eq!(id.slug, "welcome-post");
        assert_eq!(id.to_string(), "2015-08-24-welcome-post");
    }

    #[test]
    fn test_document_id_rejects_bad_stems() {
        for stem in ["notes", "2015-13-99-impossible", "2015-08-24", "2015-08-24-"] {
            assert!(DocumentId::from_file_stem(stem).is_none(), "{}", stem);
        }
    }

    #[test]
    fn test_split_front_matter() {
        let (front_matter, body) =
            split_front_matter("---\ntitle: Hi\n---\nBody text").unwrap();
        assert_eq!(front_matter, "\ntitle: Hi\n");
        assert_eq!(body, "\nBody text");
    }

    #[test]
    fn test_split_front_matter_missing_fences() {
        assert!(split_front_matter("title: Hi\n").is_none());
        assert!(split_front_matter("---\ntitle: Hi\n").is_none());
    }

    #[test]
    fn test_load_path_missing_fence() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "2015-08-24-no-fence.md", "just a body\n");
        let err = load_path(&dir.path().join("2015-08-24-no-fence.md")).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_load_path_missing_identifier() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.md", "---\ntitle: Hi\n---\n");
        let err = load_path(&dir.path().join("notes.md")).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { .. }));
    }

    #[test]
    fn test_scan_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "2015-08-24-first.md",
            "---\ntitle: First\n---\nbody",
        );
        write_file(
            dir.path(),
            "2015-09-05-second.markdown",
            "---\ntitle: Second\n---\nbody",
        );
        write_file(dir.path(), "README.txt", "not a source file");

        let loader = Loader::new(dir.path());
        let ids = |loader: &Loader| -> Vec<String> {
            loader
                .scan()
                .map(|raw| raw.unwrap().id.to_string())
                .collect()
        };

        let first = ids(&loader);
        assert_eq!(first, ["2015-08-24-first", "2015-09-05-second"]);
        // A second scan starts over from scratch and sees the same files.
        assert_eq!(ids(&loader), first);
    }
}
