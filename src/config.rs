use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::coverage::Ratio;
use crate::schema::BlockScan;
use crate::test_names::{MUTATION_RESOLVER_PREFIX, QUERY_RESOLVER_PREFIX, TestNameConvention};
use crate::units::{RESOLVER_TEST_SUFFIX, SCHEMA_SUFFIX};

pub const DEFAULT_CONFIG_FILE: &str = ".graphql-coverage.toml";
pub const DEFAULT_IGNORE: &[&str] = &[".git", ".idea", ".DS_Store"];

/// Settings read from `.graphql-coverage.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub schema_suffix: String,
    pub test_suffix: String,
    pub query_prefix: String,
    pub mutation_prefix: String,
    pub ignore: Vec<String>,
    pub block_scan: BlockScan,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_suffix: SCHEMA_SUFFIX.to_string(),
            test_suffix: RESOLVER_TEST_SUFFIX.to_string(),
            query_prefix: QUERY_RESOLVER_PREFIX.to_string(),
            mutation_prefix: MUTATION_RESOLVER_PREFIX.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            block_scan: BlockScan::default(),
        }
    }
}

impl Config {
    pub fn convention(&self) -> TestNameConvention {
        TestNameConvention {
            query_prefix: self.query_prefix.clone(),
            mutation_prefix: self.mutation_prefix.clone(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config =
        toml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    if config.schema_suffix.is_empty() || config.test_suffix.is_empty() {
        anyhow::bail!("{}: suffixes must not be empty", path.display());
    }
    Ok(config)
}

/// Loads `explicit` if given, else the default file in the working directory when it
/// exists, else built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(p) = explicit {
        return load_config(p);
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        tracing::debug!(path = %default.display(), "loading config");
        return load_config(&default);
    }
    Ok(Config::default())
}

/// Writes the percentage with two decimals (`66.67`), or `n/a` when undefined.
pub fn write_percent(path: &Path, ratio: Ratio) -> anyhow::Result<()> {
    let text = match ratio.value() {
        Some(v) => format!("{v:.2}"),
        None => {
            tracing::warn!(path = %path.display(), "coverage undefined, writing n/a");
            "n/a".to_string()
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
