//! Typed command builders for the two external stages.
//!
//! The argument shapes are a fixed contract with the `phone_probs` and
//! `segment` executables and must be reproduced exactly; each builder turns
//! a typed per-stage configuration into a structured argv so no path or
//! flag value ever passes through a shell.

use std::path::{Path, PathBuf};

use crate::model::ModelBundle;

/// Minimum-evaluation threshold passed to the likelihood stage.
pub const EVAL_MIN_GAUSSIANS: &str = "0.15";

/// Default beam width for the segmentation stage.
pub const DEFAULT_BEAM: f64 = 100.0;

/// Default token budget for the segmentation stage.
pub const DEFAULT_TOKEN_LIMIT: u32 = 500;

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// The acoustic likelihood computation for one batch.
///
/// Invoked as:
/// `phone_probs -b <model> -c <model>.cfg -r <recipe> -o <workspace>
///  -C <model>.gcl --eval-ming=0.15 -B <batches> -I <index> -i 1`
#[derive(Debug, Clone)]
pub struct LikelihoodStage {
    pub model: ModelBundle,
    pub recipe: PathBuf,
    pub workspace: PathBuf,
    pub batches: u32,
    pub index: u32,
}

impl LikelihoodStage {
    pub const LABEL: &'static str = "likelihood";

    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "-b".to_owned(),
            path_arg(&self.model.basename),
            "-c".to_owned(),
            path_arg(&self.model.config_file()),
            "-r".to_owned(),
            path_arg(&self.recipe),
            "-o".to_owned(),
            path_arg(&self.workspace),
            "-C".to_owned(),
            path_arg(&self.model.cluster_index()),
            format!("--eval-ming={EVAL_MIN_GAUSSIANS}"),
            "-B".to_owned(),
            self.batches.to_string(),
            "-I".to_owned(),
            self.index.to_string(),
            "-i".to_owned(),
            "1".to_owned(),
        ]
    }
}

/// The time-alignment/segmentation pass for one batch, consuming the
/// likelihood output left in the workspace.
///
/// Invoked as:
/// `segment -t <beam> -l <tokens> -n <workspace> -B <batches> -I <index>
///  [-s <lexicon>] [-d <model>.dur] <model>.ph <recipe>`
///
/// The lexicon argument enables text-aware alignment and appears exactly
/// when a lexicon is configured; the duration-model argument exactly when
/// the bundle's duration model is enabled.
#[derive(Debug, Clone)]
pub struct SegmentationStage {
    pub model: ModelBundle,
    pub recipe: PathBuf,
    pub workspace: PathBuf,
    pub batches: u32,
    pub index: u32,
    pub lexicon: Option<PathBuf>,
    pub beam: f64,
    pub token_limit: u32,
}

impl SegmentationStage {
    pub const LABEL: &'static str = "segmentation";

    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-t".to_owned(),
            self.beam.to_string(),
            "-l".to_owned(),
            self.token_limit.to_string(),
            "-n".to_owned(),
            path_arg(&self.workspace),
            "-B".to_owned(),
            self.batches.to_string(),
            "-I".to_owned(),
            self.index.to_string(),
        ];
        if let Some(lexicon) = &self.lexicon {
            args.push("-s".to_owned());
            args.push(path_arg(lexicon));
        }
        if let Some(duration) = self.model.duration_file() {
            args.push("-d".to_owned());
            args.push(path_arg(&duration));
        }
        args.push(path_arg(&self.model.phoneme_inventory()));
        args.push(path_arg(&self.recipe));
        args
    }
}
