use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "episode-renamer")]
#[command(about = "Rename video and subtitle files into a normalized <Show>SxxExx scheme")]
#[command(long_about = "Rename video and subtitle files into a normalized <Show>SxxExx scheme.\n\n\
Flags use the double-dash form: --dir <PATH> --dryrun false (not -dir / -dryrun).")]
pub struct Cli {
    /// Directory to scan for episode files
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,

    /// Set to false to execute the renames
    #[arg(long = "dryrun", action = ArgAction::Set, default_value_t = true)]
    pub dryrun: bool,

    /// Path to the show configuration (YAML, or TOML by extension)
    #[arg(short = 'c', long = "config", default_value = "config.yaml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["episode-renamer"]).unwrap();
        assert!(cli.dir.is_none());
        assert!(cli.dryrun);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn test_dryrun_takes_explicit_value() {
        let cli =
            Cli::try_parse_from(["episode-renamer", "--dir", "/tv", "--dryrun", "false"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tv")));
        assert!(!cli.dryrun);

        let cli = Cli::try_parse_from(["episode-renamer", "-d", "/tv", "--dryrun", "true"]).unwrap();
        assert!(cli.dryrun);
    }

    #[test]
    fn test_long_help_names_double_dash_flags() {
        use clap::CommandFactory;
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("--dir <PATH> --dryrun false"));
    }

    #[test]
    fn test_single_dash_dir_is_rejected() {
        assert!(Cli::try_parse_from(["episode-renamer", "-dir", "/tv"]).is_err());
    }

    #[test]
    fn test_dryrun_rejects_non_bool() {
        assert!(Cli::try_parse_from(["episode-renamer", "--dryrun", "maybe"]).is_err());
    }
}
