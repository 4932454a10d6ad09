use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

const PROJECT_FILE: &str = "plinth.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default)]
    source_directory: Option<PathBuf>,

    #[serde(default)]
    index_page_size: PageSize,

    #[serde(default)]
    threads: Option<usize>,
}

/// Build-scoped configuration, passed explicitly into the pipeline and
/// discarded with the build. There is no ambient config state.
pub struct Config {
    pub source_directory: PathBuf,
    pub site_root: Url,
    pub posts_url: Url,
    pub index_url: Url,
    pub index_page_size: usize,
    pub threads: usize,
}

impl Config {
    pub fn from_directory(dir: &Path, threads: Option<usize>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, threads)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, threads),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, threads: Option<usize>) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path `{}`",
                path.display()
            )
        })?;

        let site_root = with_trailing_slash(project.site_root);
        Ok(Config {
            posts_url: site_root.join("posts/")?,
            index_url: site_root.join("pages/")?,
            site_root,
            source_directory: project_root.join(
                project
                    .source_directory
                    .as_deref()
                    .unwrap_or_else(|| Path::new("posts")),
            ),
            index_page_size: project.index_page_size.0.max(1),
            threads: threads.or(project.threads).unwrap_or_else(num_cpus::get),
        })
    }
}

// `Url::join` treats a base without a trailing slash as a file name and
// replaces it, so the root must end in `/` before child URLs are derived.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
