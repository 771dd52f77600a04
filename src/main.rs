//! credit-risk: train a German credit classifier and serve it over HTTP

use anyhow::Result;
use clap::Parser;

use credit_risk::cli::{run_predict, run_serve, run_train, Cli, Commands};
use credit_risk::utils::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Serve(args) => run_serve(args),
        Commands::Predict(args) => run_predict(args),
    }
}
