use clap::Parser;
use std::path::PathBuf;

/// File-name pattern used in directory mode
pub const DEFAULT_PATTERN: &str = "*.yaml";

const EXAMPLES: &str = "\
Examples:
  ha-convert automations.yaml                        Convert a single file
  ha-convert automations.yaml -o new_auto.yaml       Choose the output file
  ha-convert /config/automations -d                  Convert a whole directory
  ha-convert /config/automations -d --pattern 'auto_*.yaml'
  ha-convert automations.yaml --dry-run              Preview the changes
  ha-convert automations.yaml --no-comments          Re-serialize instead of editing
  ha-convert --string 'alias: test ...'              Convert a YAML string";

#[derive(Parser, Debug)]
#[command(
    name = "ha-convert",
    version,
    about = "Convert Home Assistant automations from trigger/condition/action to triggers/conditions/actions",
    after_help = EXAMPLES
)]
pub struct Cli {
    /// YAML file to convert, or a directory with -d
    #[arg(required_unless_present = "string")]
    pub input: Option<PathBuf>,

    /// Output file (single-file mode only; default: <name>.new.yaml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Convert every matching YAML file in the input directory
    #[arg(short, long)]
    pub directory: bool,

    /// File-name pattern in directory mode (*.yml files are always included)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Do not preserve comments and formatting
    #[arg(long)]
    pub no_comments: bool,

    /// Convert a YAML string and print the result
    #[arg(long, conflicts_with_all = ["input", "directory", "output"])]
    pub string: Option<String>,

    /// Show what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ha-convert", "automations.yaml"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("automations.yaml")));
        assert_eq!(cli.pattern, DEFAULT_PATTERN);
        assert!(!cli.directory && !cli.dry_run && !cli.no_comments);
    }

    #[test]
    fn test_string_conflicts_with_input() {
        let result = Cli::try_parse_from(["ha-convert", "a.yaml", "--string", "alias: x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_or_string_required() {
        assert!(Cli::try_parse_from(["ha-convert"]).is_err());
        assert!(Cli::try_parse_from(["ha-convert", "--string", "alias: x"]).is_ok());
    }
}
