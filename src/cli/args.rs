use crate::constants::{exit_codes, verbosity, STDOUT_INDICATOR};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for hdlmanifest.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file, or a directory containing hdlmanifest.{json,yaml,yml}.
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,

    /// Layout templates merged under the inline ones.
    #[arg(long)]
    pub layouts: Option<PathBuf>,

    /// Repository root, overriding the settings and $REPO_ROOT.
    #[arg(long = "repo-root")]
    pub repo_root: Option<PathBuf>,

    /// Manifest destination, or `-` for stdout.
    #[arg(short, long, default_value = STDOUT_INDICATOR)]
    pub output: String,

    /// Never check dependencies out; missing working copies are reported instead.
    #[arg(long = "no-checkout")]
    pub no_checkout: bool,

    /// Never prompt for repository passwords.
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse command line arguments, printing the help when the settings path is missing.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbose_flags_to_log_filters() {
        assert_eq!(get_log_level_from_verbose(verbosity::OFF), LevelFilter::Error);
        assert_eq!(get_log_level_from_verbose(verbosity::INFO), LevelFilter::Info);
        assert_eq!(get_log_level_from_verbose(verbosity::DEBUG), LevelFilter::Debug);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE), LevelFilter::Trace);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE + 1), LevelFilter::Trace);
    }

    #[test]
    fn parses_minimal_args() {
        let args = Args::parse_from(["hdlmanifest", "project/hdlmanifest.yml"]);
        assert_eq!(args.settings, PathBuf::from("project/hdlmanifest.yml"));
        assert_eq!(args.output, "-");
        assert!(!args.no_checkout);
        assert!(!args.non_interactive);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn parses_full_feature_flags() {
        let args = Args::parse_from([
            "hdlmanifest",
            "project",
            "--layouts",
            "layouts.yml",
            "--repo-root",
            "/work/repo",
            "-o",
            "build/manifest.json",
            "--no-checkout",
            "--non-interactive",
            "-vv",
        ]);
        assert_eq!(args.settings, PathBuf::from("project"));
        assert_eq!(args.layouts, Some(PathBuf::from("layouts.yml")));
        assert_eq!(args.repo_root, Some(PathBuf::from("/work/repo")));
        assert_eq!(args.output, "build/manifest.json");
        assert!(args.no_checkout);
        assert!(args.non_interactive);
        assert_eq!(args.verbose, 2);
    }
}
