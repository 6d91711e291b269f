use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::units::SourceItem;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Something that can hand over the raw files whose names end in a suffix.
pub trait Source {
    fn items(&self, suffix: &str) -> anyhow::Result<Vec<SourceItem>>;
}

/// Files under a local directory tree, sorted by path.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    ignore: Vec<String>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>, ignore: Vec<String>) -> Self {
        Self {
            root: root.into(),
            ignore,
        }
    }

    /// Relative paths (with `/` separators) of files ending in `suffix`.
    pub fn names(&self, suffix: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .paths(suffix)?
            .into_iter()
            .map(|(rel, _)| rel)
            .collect())
    }

    fn is_ignored(&self, rel: &str) -> bool {
        self.ignore.iter().any(|frag| rel.contains(frag.as_str()))
    }

    fn paths(&self, suffix: &str) -> anyhow::Result<Vec<(String, PathBuf)>> {
        if !self.root.is_dir() {
            anyhow::bail!("not a directory: {}", self.root.display());
        }
        let mut out = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(&relative(&self.root, e.path())));
        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = relative(&self.root, entry.path());
            if rel.ends_with(suffix) {
                out.push((rel, entry.into_path()));
            }
        }
        Ok(out)
    }
}

impl Source for DirSource {
    fn items(&self, suffix: &str) -> anyhow::Result<Vec<SourceItem>> {
        let mut out = Vec::new();
        for (rel, path) in self.paths(suffix)? {
            let content =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            out.push(SourceItem::new(rel, content));
        }
        tracing::debug!(root = %self.root.display(), suffix, count = out.len(), "collected files");
        Ok(out)
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// One directory of a GitHub repository, read through the contents API.
#[derive(Debug, Clone)]
pub struct GithubSource {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub git_ref: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

impl GithubSource {
    /// Parses `owner/name`.
    pub fn new(repo: &str, path: &str) -> anyhow::Result<Self> {
        let Some((owner, name)) = repo.split_once('/') else {
            anyhow::bail!("expected repository as owner/name, got {repo:?}");
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            anyhow::bail!("expected repository as owner/name, got {repo:?}");
        }
        Ok(Self {
            api_url: GITHUB_API_URL.to_string(),
            owner: owner.to_string(),
            repo: name.to_string(),
            path: path.trim_matches('/').to_string(),
            git_ref: None,
            token: None,
        })
    }

    fn contents_url(&self) -> String {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.path
        );
        match self.git_ref.as_deref() {
            Some(r) => format!("{url}?ref={r}"),
            None => url,
        }
    }

    fn get(
        &self,
        http: &reqwest::blocking::Client,
        url: &str,
    ) -> anyhow::Result<reqwest::blocking::Response> {
        let mut req = http.get(url);
        if let Some(t) = self.token.as_ref() {
            req = req.bearer_auth(t);
        }
        let resp = req.send().with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: http error {status}");
        }
        Ok(resp)
    }
}

impl Source for GithubSource {
    fn items(&self, suffix: &str) -> anyhow::Result<Vec<SourceItem>> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("graphql-coverage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let listing_url = self.contents_url();
        let entries: Vec<ContentEntry> = self
            .get(&http, &listing_url)?
            .json()
            .with_context(|| format!("unexpected contents listing from {listing_url}"))?;

        let mut out = Vec::new();
        for entry in entries {
            if entry.kind != "file" || !entry.name.ends_with(suffix) {
                continue;
            }
            let Some(url) = entry.download_url.as_deref() else {
                anyhow::bail!("no download_url for {}", entry.name);
            };
            let body = self.get(&http, url)?.bytes()?;
            tracing::debug!(name = %entry.name, bytes = body.len(), "downloaded");
            out.push(SourceItem::new(entry.name, body.to_vec()));
        }
        Ok(out)
    }
}

/// Clones `url` into `dest` with `git clone --depth 1`, reusing `dest` if it already exists.
pub fn clone_repo(url: &str, dest: &Path) -> anyhow::Result<PathBuf> {
    if dest.exists() {
        tracing::info!(dest = %dest.display(), "reusing existing checkout");
        return Ok(dest.to_path_buf());
    }
    tracing::info!(url, dest = %dest.display(), "cloning");
    let out = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .output()
        .context("failed to run 'git clone'. Is git installed?")?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        anyhow::bail!("git clone failed: {}", stderr.trim());
    }
    Ok(dest.to_path_buf())
}
