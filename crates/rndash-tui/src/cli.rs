//! Command-line interface definition for the dashboard binary.

use std::path::PathBuf;

use clap::Parser;

/// Top-level argument parser. The binary takes a project directory and a
/// couple of overrides; everything else is driven from the dashboard.
#[derive(Parser)]
#[command(name = "rndash")]
#[command(about = "Terminal dashboard for React Native dev processes")]
#[command(version)]
pub struct Cli {
    /// React Native project directory (defaults to the current directory)
    pub project: Option<PathBuf>,

    /// Force a UI language tag, e.g. `es` or `en`
    #[arg(long = "lang")]
    pub lang: Option<String>,

    /// Enable verbose/debug output in the log file
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn project_and_overrides_parse() {
        let cli = Cli::parse_from(["rndash", "--lang", "es", "-v", "/tmp/app"]);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/app")));
        assert_eq!(cli.lang.as_deref(), Some("es"));
        assert!(cli.verbose);
    }
}
