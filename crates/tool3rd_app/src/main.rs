use clap::Parser;
use tool3rd_app::cli::Cli;
use tool3rd_app::{app, logging};

fn main() -> anyhow::Result<()> {
    let options = Cli::parse().into_options();
    logging::initialize(options.log, options.log_level, &options.user_data);
    app::run(options)
}
