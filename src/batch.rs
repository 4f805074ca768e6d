//! The unit of work: one batch index, its private workspace, and the two
//! sequential external invocations that run inside it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AlignError;
use crate::model::BatchOutcome;
use crate::orchestrator::RunConfig;
use crate::process::run_command;
use crate::stage::{LikelihoodStage, SegmentationStage};

/// One batch of the run. Owns its workspace directory for the duration of
/// `run`; no other worker ever touches it.
#[derive(Debug)]
pub struct BatchTask<'a> {
    config: &'a RunConfig,
    index: u32,
}

impl<'a> BatchTask<'a> {
    #[must_use]
    pub fn new(config: &'a RunConfig, index: u32) -> Self {
        Self { config, index }
    }

    /// Workspace directory for this batch index under the configured root.
    #[must_use]
    pub fn workspace(&self) -> PathBuf {
        self.config
            .workspace_root
            .join(format!("segment_temp_{}", self.index))
    }

    /// Run the likelihood and segmentation stages for this batch.
    ///
    /// The workspace is removed unconditionally once the stages have
    /// returned, whatever their exit status. Failures are confined to this
    /// batch: they are captured in the returned outcome, never propagated
    /// as a panic or error that could disturb the rest of the cohort.
    #[must_use]
    pub fn run(&self) -> BatchOutcome {
        let workspace = self.workspace();
        if let Err(err) = fs::create_dir_all(&workspace) {
            let err = AlignError::Resource {
                batch: self.index,
                message: format!("creating `{}`: {err}", workspace.display()),
            };
            tracing::warn!(batch = self.index, error = %err, "workspace creation failed");
            return BatchOutcome::failed(self.index, "workspace", &err);
        }

        let outcome = self.run_stages(&workspace);

        if let Err(err) = fs::remove_dir_all(&workspace) {
            let err = AlignError::Resource {
                batch: self.index,
                message: format!("removing `{}`: {err}", workspace.display()),
            };
            tracing::warn!(batch = self.index, error = %err, "workspace cleanup failed");
            // A stage failure is the more interesting diagnostic; only
            // promote the cleanup error when the stages themselves passed.
            if outcome.is_ok() {
                return BatchOutcome::failed(self.index, "workspace", &err);
            }
        }

        outcome
    }

    fn run_stages(&self, workspace: &Path) -> BatchOutcome {
        let likelihood = LikelihoodStage {
            model: self.config.model.clone(),
            recipe: self.config.recipe.clone(),
            workspace: workspace.to_path_buf(),
            batches: self.config.batches,
            index: self.index,
        };
        tracing::info!(batch = self.index, stage = LikelihoodStage::LABEL, "starting");
        if let Err(err) = run_command(&self.config.likelihood_exe, &likelihood.args(), None) {
            tracing::warn!(batch = self.index, error = %err, "likelihood stage failed");
            // The segmentation stage consumes the likelihood output; with
            // that output missing there is nothing left to align.
            return BatchOutcome::failed(self.index, LikelihoodStage::LABEL, &err);
        }

        let segmentation = SegmentationStage {
            model: self.config.model.clone(),
            recipe: self.config.recipe.clone(),
            workspace: workspace.to_path_buf(),
            batches: self.config.batches,
            index: self.index,
            lexicon: self.config.lexicon.clone(),
            beam: self.config.beam,
            token_limit: self.config.token_limit,
        };
        tracing::info!(batch = self.index, stage = SegmentationStage::LABEL, "starting");
        if let Err(err) = run_command(&self.config.segment_exe, &segmentation.args(), None) {
            tracing::warn!(batch = self.index, error = %err, "segmentation stage failed");
            return BatchOutcome::failed(self.index, SegmentationStage::LABEL, &err);
        }

        BatchOutcome::ok(self.index)
    }
}
