use anyhow::Result;
use clap::Parser;
use whisker_route::cli::{is_fatal, run, Cli};
use whisker_route::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    logging::init(cli.log_format(&config), cli.verbose);

    run(cli, config).inspect_err(|err| {
        if is_fatal(err) {
            tracing::error!(error = %format!("{err:#}"), "internal planner error, please report it");
        }
    })
}
