use clap::Parser;
use commit_order::cli::{Cli, Commands};
use commit_order::cli_handlers;
use commit_order::config::WeightPolicy;
use std::process;

fn main() {
    // Logs go to stderr so the order on stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sort { file, format } => cli_handlers::handle_sort(&file, format),
        Commands::Schema {
            file,
            sql,
            hard_weight,
            soft_weight,
            format,
        } => {
            let policy = WeightPolicy {
                hard: hard_weight,
                soft: soft_weight,
            };
            cli_handlers::handle_schema(&file, sql, policy, format)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
