use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::{Config, resolve_config, write_percent};
use crate::coverage::{compute_coverage, file_coverage};
use crate::schema::{BlockScan, OperationExtractor};
use crate::source::{DirSource, GITHUB_API_URL, GithubSource, Source, clone_repo};
use crate::test_names::TestNameExtractor;
use crate::types::UnitId;
use crate::units::{aggregate_schema_units, aggregate_test_units, unit_id};

mod render;

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "graphql-coverage")]
#[command(about = "Approximate resolver test coverage for GraphQL schema files", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub output: OutputFormat,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Config file (defaults to `.graphql-coverage.toml` in the working directory, if present).
    #[arg(long, global = true, env = "GRAPHQL_COVERAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write the total percentage to this file, e.g. `coverage.txt`.
    #[arg(long, global = true)]
    pub write: Option<PathBuf>,

    /// Log more (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Operation coverage over local schema and test directories.
    Scan(ScanArgs),
    /// Operation coverage over two directories of a GitHub repository.
    Github(GithubArgs),
    /// Clone a repository (or reuse a checkout) and scan it.
    Clone(CloneArgs),
    /// File-presence coverage: test files relative to schema files.
    Files(FilesArgs),
    Version,
}

/// Overrides for values otherwise taken from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ExtractArgs {
    #[arg(long)]
    pub schema_suffix: Option<String>,

    #[arg(long)]
    pub test_suffix: Option<String>,

    #[arg(long)]
    pub query_prefix: Option<String>,

    #[arg(long)]
    pub mutation_prefix: Option<String>,

    #[arg(long, value_enum)]
    pub block_scan: Option<BlockScan>,
}

impl ExtractArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(s) = &self.schema_suffix {
            config.schema_suffix = s.clone();
        }
        if let Some(s) = &self.test_suffix {
            config.test_suffix = s.clone();
        }
        if let Some(p) = &self.query_prefix {
            config.query_prefix = p.clone();
        }
        if let Some(p) = &self.mutation_prefix {
            config.mutation_prefix = p.clone();
        }
        if let Some(scan) = self.block_scan {
            config.block_scan = scan;
        }
        config
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[arg(long)]
    pub schema_dir: PathBuf,

    #[arg(long)]
    pub test_dir: PathBuf,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

#[derive(Debug, Clone, Args)]
pub struct GithubArgs {
    /// Repository as `owner/name`.
    #[arg(long)]
    pub repo: String,

    #[arg(long, default_value = "graph/schemas")]
    pub schema_path: String,

    #[arg(long, default_value = "graph/resolver")]
    pub test_path: String,

    /// Branch, tag or commit (defaults to the repository's default branch).
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    pub api_url: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CloneArgs {
    #[arg(long)]
    pub url: String,

    /// Checkout directory; reused as-is when it already exists.
    #[arg(long)]
    pub dest: PathBuf,

    /// Schema directory, relative to `--dest`.
    #[arg(long)]
    pub schema_dir: PathBuf,

    /// Test directory, relative to `--dest`.
    #[arg(long)]
    pub test_dir: PathBuf,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

#[derive(Debug, Clone, Args)]
pub struct FilesArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long, default_value = ".graphql")]
    pub schema_suffix: String,

    #[arg(long, default_value = ".test.ts")]
    pub test_suffix: String,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if let Command::Version = &cli.command {
        println!("graphql-coverage {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = resolve_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Scan(args) => {
            let config = args.extract.apply(config);
            let schemas = DirSource::new(&args.schema_dir, config.ignore.clone());
            let tests = DirSource::new(&args.test_dir, config.ignore.clone());
            run_operations(&cli, &config, &schemas, &tests)
        }
        Command::Github(args) => {
            let config = args.extract.apply(config);
            let mut schemas = GithubSource::new(&args.repo, &args.schema_path)?;
            schemas.api_url = args.api_url.clone();
            schemas.git_ref = args.git_ref.clone();
            schemas.token = args.github_token.clone();
            let tests = GithubSource {
                path: args.test_path.trim_matches('/').to_string(),
                ..schemas.clone()
            };
            run_operations(&cli, &config, &schemas, &tests)
        }
        Command::Clone(args) => {
            let config = args.extract.apply(config);
            let root = clone_repo(&args.url, &args.dest)?;
            let schemas = DirSource::new(root.join(&args.schema_dir), config.ignore.clone());
            let tests = DirSource::new(root.join(&args.test_dir), config.ignore.clone());
            run_operations(&cli, &config, &schemas, &tests)
        }
        Command::Files(args) => {
            let src = DirSource::new(&args.root, config.ignore.clone());
            let schema_ids = ids(src.names(&args.schema_suffix)?, &args.schema_suffix);
            let test_ids = ids(src.names(&args.test_suffix)?, &args.test_suffix);
            let files = file_coverage(&schema_ids, &test_ids);
            tracing::info!(
                schema_files = files.schema_files,
                test_files = files.test_files,
                "file coverage"
            );
            render::render_files(&cli, &files)?;
            if let Some(path) = &cli.write {
                write_percent(path, files.percent())?;
            }
            Ok(())
        }
        Command::Version => unreachable!(),
    }
}

fn run_operations(
    cli: &Cli,
    config: &Config,
    schema_source: &dyn Source,
    test_source: &dyn Source,
) -> anyhow::Result<()> {
    let operations = OperationExtractor::new(config.block_scan);
    let test_names = TestNameExtractor::new(&config.convention())?;

    let schema_items = schema_source.items(&config.schema_suffix)?;
    let test_items = test_source.items(&config.test_suffix)?;
    let schema_units = aggregate_schema_units(&schema_items, &config.schema_suffix, &operations);
    let test_units = aggregate_test_units(&test_items, &config.test_suffix, &test_names);

    let report = compute_coverage(&schema_units, &test_units);
    let files = file_coverage(
        &schema_units.iter().map(|u| u.id.clone()).collect::<Vec<_>>(),
        &test_units.iter().map(|u| u.id.clone()).collect::<Vec<_>>(),
    );
    tracing::info!(
        declared = report.total_declared,
        tested = report.total_tested,
        "operation coverage"
    );

    render::render_operations(cli, &report, &files)?;
    if let Some(path) = &cli.write {
        write_percent(path, report.percent())?;
    }
    Ok(())
}

fn ids(names: Vec<String>, suffix: &str) -> Vec<UnitId> {
    names.iter().filter_map(|n| unit_id(n, suffix)).collect()
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when `run` is called more than once in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn should_color(cli: &Cli) -> bool {
    match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_args_override_config() {
        let args = ExtractArgs {
            schema_suffix: Some(".graphql".to_string()),
            block_scan: Some(BlockScan::BraceDepth),
            ..ExtractArgs::default()
        };
        let config = args.apply(Config::default());
        assert_eq!(config.schema_suffix, ".graphql");
        assert_eq!(config.test_suffix, ".resolvers_it_test.go");
        assert_eq!(config.block_scan, BlockScan::BraceDepth);
    }

    #[test]
    fn cli_parses_scan() {
        let cli = Cli::try_parse_from([
            "graphql-coverage",
            "--output",
            "json",
            "scan",
            "--schema-dir",
            "s",
            "--test-dir",
            "t",
            "--block-scan",
            "brace-depth",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.schema_dir, PathBuf::from("s"));
        assert_eq!(args.extract.block_scan, Some(BlockScan::BraceDepth));
    }

    #[test]
    fn ids_skip_non_matching_names() {
        let got = ids(
            vec!["a/x.test.ts".to_string(), "b.ts".to_string()],
            ".test.ts",
        );
        assert_eq!(got, vec![UnitId::from("x")]);
    }
}
