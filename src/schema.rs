use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[^@\s]*").expect("directive pattern"));
static OPERATION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\(").expect("operation name pattern"));

/// How the body of an `extend type Query { … }` block is delimited.
///
/// Both modes only ever look at the first extension block of a root type; later
/// `extend type Query` blocks in the same file are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockScan {
    /// The block ends at the first `}` after the opener. Nested braces (input object
    /// defaults, descriptions containing `}`) truncate the block early; this is a known
    /// limitation kept as the default so counts stay comparable across runs.
    #[default]
    FirstClose,
    /// The block ends at the brace that balances the opener.
    BraceDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootType {
    Query,
    Mutation,
}

impl RootType {
    fn opener(self) -> &'static str {
        match self {
            RootType::Query => "extend type Query {",
            RootType::Mutation => "extend type Mutation {",
        }
    }
}

/// Operation names declared by one schema file, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Operations {
    pub queries: Vec<String>,
    pub mutations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OperationExtractor {
    scan: BlockScan,
}

impl OperationExtractor {
    pub fn new(scan: BlockScan) -> Self {
        Self { scan }
    }

    pub fn scan(&self) -> BlockScan {
        self.scan
    }

    pub fn extract(&self, sdl: &str) -> Operations {
        Operations {
            queries: self.names(sdl, RootType::Query),
            mutations: self.names(sdl, RootType::Mutation),
        }
    }

    /// Names of the fields taking arguments inside the first extension block of `root`.
    /// A missing block is not an error; it yields no names.
    pub fn names(&self, sdl: &str, root: RootType) -> Vec<String> {
        let Some(block) = self.block(sdl, root) else {
            return Vec::new();
        };
        let sanitized = DIRECTIVE.replace_all(block, "");
        OPERATION_NAME
            .captures_iter(&sanitized)
            .map(|c| c[1].to_string())
            .collect()
    }

    fn block<'a>(&self, sdl: &'a str, root: RootType) -> Option<&'a str> {
        let opener = root.opener();
        let start = sdl.find(opener)? + opener.len();
        let body = &sdl[start..];
        let end = match self.scan {
            BlockScan::FirstClose => body.find('}')?,
            BlockScan::BraceDepth => balancing_close(body)?,
        };
        Some(&body[..end])
    }
}

/// Extracts operations with the default first-close block scan.
pub fn extract_operations(sdl: &str) -> Operations {
    OperationExtractor::default().extract(sdl)
}

fn balancing_close(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
