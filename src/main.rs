use clap::Parser;

use graphql_coverage::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    graphql_coverage::cli::run(cli)
}
