//! Converts a [`Collection`] into a [`RenderPlan`]: the full list of pages
//! an external renderer should produce. We need to create groups of
//! listing pages for each tag and each category, plus one group for the
//! whole collection. Each group is paginated into pages based on a
//! configurable number of documents per page; every document additionally
//! gets a page of its own, linked to its chronological neighbors. The plan
//! carries URLs and output paths but no markup; applying templates is
//! outside this crate.

use std::path::PathBuf;

use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::site::Collection;
use crate::source::DocumentId;

/// The set of pages to render for one build, in deterministic order: the
/// full listing first, then tag listings, then category listings, then one
/// page per document.
#[derive(Debug, Serialize)]
pub struct RenderPlan {
    pub pages: Vec<Page>,
}

/// One output page. `prev` and `next` link neighboring pages: for document
/// pages the chronological neighbors, for listing pages the neighboring
/// page of the same listing.
#[derive(Debug, Serialize)]
pub struct Page {
    pub url: Url,
    pub path: PathBuf,
    pub prev: Option<Url>,
    pub next: Option<Url>,
    pub content: PageContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageContent {
    /// A single document page.
    Post { id: DocumentId },

    /// One page of a paginated listing. `number` is zero-based; `total` is
    /// the page count for the listing's scope.
    Listing {
        scope: ListingScope,
        ids: Vec<DocumentId>,
        number: usize,
        total: usize,
    },
}

/// Which slice of the collection a listing page covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope {
    All,
    Tag(String),
    Category(String),
}

/// Builds the [`RenderPlan`] for an assembled [`Collection`]. Pure and
/// deterministic: the taxonomy maps iterate in key order and the documents
/// are already totally ordered, so the same collection always yields the
/// same plan.
pub fn render_plan(collection: &Collection, config: &Config) -> Result<RenderPlan> {
    let mut pages = Vec::new();

    let all: Vec<DocumentId> = collection
        .documents()
        .iter()
        .map(|document| document.id.clone())
        .collect();
    listing_pages(
        ListingScope::All,
        &all,
        &config.index_url,
        PathBuf::from("pages"),
        config.index_page_size,
        &mut pages,
    )?;

    for (tag, ids) in collection.by_tag() {
        // NOTE: the trailing slash is significant. Without it, `Url::join`
        // treats the last path component as a file name to be replaced
        // rather than a directory to descend into.
        let base_url = config.index_url.join(&format!("tags/{}/", tag))?;
        listing_pages(
            ListingScope::Tag(tag.clone()),
            ids,
            &base_url,
            PathBuf::from("pages").join("tags").join(tag),
            config.index_page_size,
            &mut pages,
        )?;
    }

    for (category, ids) in collection.by_category() {
        let base_url = config.index_url.join(&format!("categories/{}/", category))?;
        listing_pages(
            ListingScope::Category(category.clone()),
            ids,
            &base_url,
            PathBuf::from("pages").join("categories").join(category),
            config.index_page_size,
            &mut pages,
        )?;
    }

    post_pages(collection, config, &mut pages)?;

    Ok(RenderPlan { pages })
}

/// Appends one [`Page`] per document, linking each to its chronological
/// neighbors (`prev` is the next-newer document, `next` the next-older).
fn post_pages(collection: &Collection, config: &Config, pages: &mut Vec<Page>) -> Result<()> {
    let documents = collection.documents();
    let mut urls = Vec::with_capacity(documents.len());
    for document in documents {
        urls.push(config.posts_url.join(&format!("{}.html", document.id))?);
    }

    for (i, document) in documents.iter().enumerate() {
        pages.push(Page {
            url: urls[i].clone(),
            path: PathBuf::from("posts").join(format!("{}.html", document.id)),
            prev: match i < 1 {
                true => None,
                false => Some(urls[i - 1].clone()),
            },
            next: match i + 1 >= documents.len() {
                true => None,
                false => Some(urls[i + 1].clone()),
            },
            content: PageContent::Post {
                id: document.id.clone(),
            },
        });
    }

    Ok(())
}

/// Appends the paginated listing pages for one scope. Page zero of a
/// listing is `index.html`; page N is `N.html`.
fn listing_pages(
    scope: ListingScope,
    ids: &[DocumentId],
    base_url: &Url,
    base_path: PathBuf,
    page_size: usize,
    pages: &mut Vec<Page>,
) -> Result<()> {
    let total = match ids.len() % page_size {
        0 => ids.len() / page_size,
        _ => ids.len() / page_size + 1,
    };

    for (number, chunk) in ids.chunks(page_size).enumerate() {
        let file_name = match number > 0 {
            false => String::from("index.html"),
            true => format!("{}.html", number),
        };

        pages.push(Page {
            url: base_url.join(&file_name)?,
            path: base_path.join(&file_name),
            prev: match number {
                0 => None,
                1 => Some(base_url.join("index.html")?),
                _ => Some(base_url.join(&format!("{}.html", number - 1))?),
            },
            next: match number + 1 < total {
                false => None,
                true => Some(base_url.join(&format!("{}.html", number + 1))?),
            },
            content: PageContent::Listing {
                scope: scope.clone(),
                ids: chunk.to_vec(),
                number,
                total,
            },
        });
    }

    Ok(())
}

/// Represents the result of a fallible planning operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error constructing a [`RenderPlan`].
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem joining page URLs.
    UrlParse(url::ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator for URL joining.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;
    use std::path::Path;

    use chrono::NaiveDate;

    use crate::document::Document;

    use super::*;

    fn config(page_size: usize) -> Config {
        let site_root = Url::parse("https://example.org/").unwrap();
        Config {
            source_directory: PathBuf::from("posts"),
            posts_url: site_root.join("posts/").unwrap(),
            index_url: site_root.join("pages/").unwrap(),
            site_root,
            index_page_size: page_size,
            threads: 1,
        }
    }

    fn document((year, month, day): (i32, u32, u32), slug: &str, tags: &[&str]) -> Document {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        Document {
            id: DocumentId {
                date,
                slug: slug.to_owned(),
            },
            source_path: PathBuf::from(format!("posts/{}-{}.md", date.format("%Y-%m-%d"), slug)),
            publish_date: date,
            title: slug.to_owned(),
            categories: BTreeSet::new(),
            tags: tags.iter().map(|t| String::from(*t)).collect(),
            comments_enabled: true,
            body: String::new(),
        }
    }

    fn collection(documents: Vec<Document>) -> Collection {
        Collection::assemble(documents).unwrap()
    }

    #[test]
    fn test_post_pages_link_chronological_neighbors() -> Result<()> {
        let collection = collection(vec![
            document((2021, 1, 1), "oldest", &[]),
            document((2021, 1, 2), "middle", &[]),
            document((2021, 1, 3), "newest", &[]),
        ]);
        let plan = render_plan(&collection, &config(10))?;

        let posts: Vec<&Page> = plan
            .pages
            .iter()
            .filter(|page| matches!(page.content, PageContent::Post { .. }))
            .collect();
        assert_eq!(posts.len(), 3);

        assert_eq!(
            posts[0].url.as_str(),
            "https://example.org/posts/2021-01-03-newest.html"
        );
        assert_eq!(posts[0].prev, None);
        assert_eq!(
            posts[0].next.as_ref().unwrap().as_str(),
            "https://example.org/posts/2021-01-02-middle.html"
        );
        assert!(posts[1].prev.is_some() && posts[1].next.is_some());
        assert_eq!(posts[2].next, None);
        Ok(())
    }

    #[test]
    fn test_listing_pagination() -> Result<()> {
        let collection = collection(vec![
            document((2021, 1, 1), "a", &[]),
            document((2021, 1, 2), "b", &[]),
            document((2021, 1, 3), "c", &[]),
        ]);
        let plan = render_plan(&collection, &config(2))?;

        let listings: Vec<&Page> = plan
            .pages
            .iter()
            .filter(|page| {
                matches!(
                    &page.content,
                    PageContent::Listing { scope: ListingScope::All, .. }
                )
            })
            .collect();
        assert_eq!(listings.len(), 2);

        assert_eq!(listings[0].url.as_str(), "https://example.org/pages/index.html");
        assert_eq!(listings[0].path, Path::new("pages/index.html"));
        assert_eq!(listings[0].prev, None);
        assert_eq!(
            listings[0].next.as_ref().unwrap().as_str(),
            "https://example.org/pages/1.html"
        );

        assert_eq!(listings[1].url.as_str(), "https://example.org/pages/1.html");
        assert_eq!(
            listings[1].prev.as_ref().unwrap().as_str(),
            "https://example.org/pages/index.html"
        );
        assert_eq!(listings[1].next, None);

        match (&listings[0].content, &listings[1].content) {
            (
                PageContent::Listing { ids: first, number: 0, total: 2, .. },
                PageContent::Listing { ids: second, number: 1, total: 2, .. },
            ) => {
                assert_eq!(first.len(), 2);
                assert_eq!(second.len(), 1);
            }
            other => panic!("unexpected listing contents: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_tag_listing_urls() -> Result<()> {
        let collection = collection(vec![document((2021, 1, 1), "a", &["rust"])]);
        let plan = render_plan(&collection, &config(10))?;

        let tag_page = plan
            .pages
            .iter()
            .find(|page| {
                matches!(
                    &page.content,
                    PageContent::Listing { scope: ListingScope::Tag(tag), .. } if tag == "rust"
                )
            })
            .unwrap();
        assert_eq!(
            tag_page.url.as_str(),
            "https://example.org/pages/tags/rust/index.html"
        );
        assert_eq!(tag_page.path, Path::new("pages/tags/rust/index.html"));
        Ok(())
    }

    #[test]
    fn test_empty_collection_yields_empty_plan() -> Result<()> {
        let plan = render_plan(&collection(Vec::new()), &config(10))?;
        assert!(plan.pages.is_empty());
        Ok(())
    }
}
