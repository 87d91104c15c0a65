//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apexcheck",
    version,
    about = "Apex syntax checker",
    long_about = "apexcheck parses Apex classes, triggers and anonymous scripts and reports syntax errors, package by package for SFDX projects.\n\nConfiguration precedence: CLI > apexcheck.toml > defaults.",
    after_help = "Examples:\n  apexcheck check\n  apexcheck check path/to/project --ext cls,trigger\n  apexcheck check force-app --no-project --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current apexcheck version."
    )]
    Version,
    /// Check Apex sources for syntax errors
    #[command(
        about = "Check for syntax errors",
        long_about = "Parse every matching file below PATH. With an sfdx-project.json at most one level below PATH, each declared package is checked separately. Exit code is the worst status: 0 clean, 1 processing failure, 2 missing path. Syntax errors are reported but do not change the exit code.",
        after_help = "Examples:\n  apexcheck check --ext cls\n  apexcheck check my-project --output json 2>/dev/null"
    )]
    Check {
        #[arg(help = "Path to check (default: current dir)")]
        path: Option<String>,
        #[arg(
            long = "ext",
            value_delimiter = ',',
            help = "Comma-separated extensions: cls,trigger,apex (default: cls,trigger)"
        )]
        extensions: Vec<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Treat PATH as one package, ignoring sfdx-project.json")]
        no_project: bool,
        #[arg(long, help = "Only log warnings and failures")]
        quiet: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_args() {
        let cli = Cli::try_parse_from([
            "apexcheck",
            "check",
            "proj",
            "--ext",
            "cls,apex",
            "--output",
            "json",
            "--no-project",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Check {
                path,
                extensions,
                output,
                no_project,
                quiet,
            } => {
                assert_eq!(path.as_deref(), Some("proj"));
                assert_eq!(extensions, vec!["cls", "apex"]);
                assert_eq!(output.as_deref(), Some("json"));
                assert!(no_project);
                assert!(!quiet);
            }
            Commands::Version => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["apexcheck", "check"]).unwrap();
        match cli.cmd {
            Commands::Check {
                path, extensions, ..
            } => {
                assert!(path.is_none());
                assert!(extensions.is_empty());
            }
            Commands::Version => panic!("expected check"),
        }
    }
}
