use std::path::PathBuf;

use clap::Parser;

use crate::model::ModelBundle;
use crate::orchestrator::RunConfig;

#[derive(Debug, Parser)]
#[command(name = "falign")]
#[command(about = "Batch forced-alignment driver for speech corpora")]
pub struct Cli {
    /// Acoustic-model basename; `<MODEL>.ph/.mc/.gk/.cfg/.gcl` must exist
    /// (plus `.dur` with --duration_model).
    pub model: PathBuf,

    /// Recipe file listing one utterance per line as `key=value` tokens.
    pub recipe: PathBuf,

    /// Number of batches to partition the recipe into.
    pub num_batches: u32,

    /// Maximum number of concurrently running batches.
    pub num_threads: u32,

    /// Use the duration model (`<MODEL>.dur`) in the segmentation stage.
    #[arg(short = 'd', long = "duration_model")]
    pub duration_model: bool,

    /// Lexicon for text-aware alignment in the segmentation stage.
    #[arg(short = 'l', long = "lexicon", value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Root directory for per-batch lna workspaces (default: system temp).
    #[arg(short = 't', long = "lna_directory", value_name = "PATH")]
    pub lna_directory: Option<PathBuf>,

    /// Print the run report as JSON instead of plain text.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Resolve CLI arguments into a run configuration.
    #[must_use]
    pub fn to_config(&self) -> RunConfig {
        let model = ModelBundle::new(self.model.clone(), self.duration_model);
        let mut config = RunConfig::new(
            model,
            self.recipe.clone(),
            self.num_batches,
            self.num_threads,
        );
        config.lexicon = self.lexicon.clone();
        if let Some(root) = &self.lna_directory {
            config.workspace_root = root.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::Cli;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("falign").chain(args.iter().copied()))
            .expect("args should parse")
    }

    #[test]
    fn positional_arguments_in_order() {
        let cli = parse(&["models/am", "corpus.recipe", "8", "4"]);
        assert_eq!(cli.model, PathBuf::from("models/am"));
        assert_eq!(cli.recipe, PathBuf::from("corpus.recipe"));
        assert_eq!(cli.num_batches, 8);
        assert_eq!(cli.num_threads, 4);
        assert!(!cli.duration_model);
        assert!(cli.lexicon.is_none());
        assert!(cli.lna_directory.is_none());
    }

    #[test]
    fn short_flags_match_original_surface() {
        let cli = parse(&[
            "am", "r", "2", "1", "-d", "-l", "words.lex", "-t", "/scratch",
        ]);
        assert!(cli.duration_model);
        assert_eq!(cli.lexicon, Some(PathBuf::from("words.lex")));
        assert_eq!(cli.lna_directory, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn long_flags_match_original_surface() {
        let cli = parse(&[
            "am",
            "r",
            "2",
            "1",
            "--duration_model",
            "--lexicon",
            "words.lex",
            "--lna_directory",
            "/scratch",
        ]);
        assert!(cli.duration_model);
        assert_eq!(cli.lexicon, Some(PathBuf::from("words.lex")));
        assert_eq!(cli.lna_directory, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn missing_positionals_fail_to_parse() {
        assert!(Cli::try_parse_from(["falign", "am", "r", "2"]).is_err());
    }

    #[test]
    fn non_numeric_batch_count_fails_to_parse() {
        assert!(Cli::try_parse_from(["falign", "am", "r", "many", "1"]).is_err());
    }

    #[test]
    fn to_config_carries_flags_through() {
        let cli = parse(&["am", "corpus.recipe", "6", "3", "-d", "-l", "w.lex"]);
        let config = cli.to_config();
        assert_eq!(config.batches, 6);
        assert_eq!(config.threads, 3);
        assert!(config.model.duration_model);
        assert_eq!(config.lexicon, Some(PathBuf::from("w.lex")));
        // Default workspace root is the system temp directory.
        assert_eq!(config.workspace_root, std::env::temp_dir());
    }

    #[test]
    fn to_config_honors_lna_directory_override() {
        let cli = parse(&["am", "r", "1", "1", "-t", "/scratch/lna"]);
        assert_eq!(
            cli.to_config().workspace_root,
            PathBuf::from("/scratch/lna")
        );
    }
}
