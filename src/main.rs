//! apexcheck CLI binary entry point.
//! Resolves settings, runs the checker and prints results.

use apexcheck::check::{check_path, check_project_with_depth, exit_status};
use apexcheck::cli::{Cli, Commands};
use apexcheck::config;
use apexcheck::models::ProjectCheckResult;
use apexcheck::output;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(quiet: bool) {
    let default = if quiet { "apexcheck=warn" } else { "apexcheck=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Check {
            path,
            extensions,
            output,
            no_project,
            quiet,
        } => {
            let eff = config::resolve_effective(
                path.as_deref(),
                Some(extensions.as_slice()),
                output.as_deref(),
                no_project.then_some(false),
                quiet.then_some(true),
            );
            init_tracing(eff.quiet);

            let results = if eff.project {
                check_project_with_depth(&eff.path, &eff.extensions, eff.max_depth)
            } else {
                let name = eff
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| ".".to_string());
                vec![ProjectCheckResult {
                    name,
                    path: ".".to_string(),
                    pkg: None,
                    result: check_path(&eff.path, &eff.extensions),
                }]
            };
            output::print_results(&results, &eff.output);
            std::process::exit(exit_status(&results) as i32);
        }
    }
}
