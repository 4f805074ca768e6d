//! Cohort-barrier worker pool driving the batch tasks.
//!
//! Batch indices `1..=N` are partitioned into sequential cohorts of at most
//! `T` indices. Each cohort launches one worker thread per index and the
//! scheduler blocks until the whole cohort has joined before dispatching the
//! next: a worker that finishes early does not pick up new work, so a
//! cohort's wall time is its slowest task. This matches what downstream
//! tooling expects from the batch partitioning, at the cost of throughput a
//! work-stealing pool would recover.

use std::path::PathBuf;
use std::thread;

use chrono::Utc;

use crate::batch::BatchTask;
use crate::error::{AlignError, AlignResult};
use crate::model::{require_file, BatchOutcome, ModelBundle, RunReport};
use crate::recipe::Recipe;
use crate::stage::{DEFAULT_BEAM, DEFAULT_TOKEN_LIMIT};

/// Everything a run needs, resolved up front. Shared read-only by all
/// workers; the only cross-worker coordination is the cohort barrier.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model: ModelBundle,
    pub recipe: PathBuf,
    pub batches: u32,
    pub threads: u32,
    pub lexicon: Option<PathBuf>,
    /// Root under which per-batch `segment_temp_<i>` workspaces live.
    pub workspace_root: PathBuf,
    pub beam: f64,
    pub token_limit: u32,
    /// Likelihood-stage program; a bare name is resolved on PATH.
    pub likelihood_exe: PathBuf,
    /// Segmentation-stage program; a bare name is resolved on PATH.
    pub segment_exe: PathBuf,
}

impl RunConfig {
    #[must_use]
    pub fn new(model: ModelBundle, recipe: PathBuf, batches: u32, threads: u32) -> Self {
        Self {
            model,
            recipe,
            batches,
            threads,
            lexicon: None,
            workspace_root: std::env::temp_dir(),
            beam: DEFAULT_BEAM,
            token_limit: DEFAULT_TOKEN_LIMIT,
            likelihood_exe: PathBuf::from("phone_probs"),
            segment_exe: PathBuf::from("segment"),
        }
    }
}

/// Partition `1..=batches` into cohorts of at most `threads` indices.
///
/// Every index appears exactly once; the last cohort may be smaller.
#[must_use]
pub fn cohorts(batches: u32, threads: u32) -> Vec<Vec<u32>> {
    let limit = threads.max(1) as usize;
    let indices: Vec<u32> = (1..=batches).collect();
    indices.chunks(limit).map(<[u32]>::to_vec).collect()
}

/// A validated alignment run over one recipe and model bundle.
pub struct AlignmentRun {
    config: RunConfig,
}

impl AlignmentRun {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Validate all inputs, then drive every cohort to completion.
    ///
    /// Configuration and recipe-format problems abort before any batch is
    /// scheduled. Per-batch failures (resource or external-process) are
    /// collected into the report and the remaining batches keep running.
    pub fn run(&self) -> AlignResult<RunReport> {
        let recipe = self.validate()?;
        let started_at = Utc::now().to_rfc3339();

        let plan = cohorts(self.config.batches, self.config.threads);
        tracing::info!(
            model = %self.config.model.basename.display(),
            utterances = recipe.len(),
            batches = self.config.batches,
            threads = self.config.threads,
            cohorts = plan.len(),
            "starting alignment run"
        );

        let mut outcomes: Vec<BatchOutcome> = Vec::with_capacity(self.config.batches as usize);
        for (k, cohort) in plan.iter().enumerate() {
            tracing::info!(cohort = k + 1, size = cohort.len(), "dispatching cohort");
            outcomes.extend(self.run_cohort(cohort));
            tracing::info!(cohort = k + 1, "cohort joined");
        }

        let report = RunReport {
            started_at_rfc3339: started_at,
            finished_at_rfc3339: Utc::now().to_rfc3339(),
            model: self.config.model.basename.clone(),
            recipe: self.config.recipe.clone(),
            utterances: recipe.len(),
            batches: self.config.batches,
            threads: self.config.threads,
            cohorts: plan.len() as u32,
            outcomes,
        };

        let failed = report.failures().len();
        if failed > 0 {
            tracing::warn!(failed, "run finished with batch failures");
        } else {
            tracing::info!("run finished");
        }
        Ok(report)
    }

    /// Launch one worker per index and join them all before returning.
    fn run_cohort(&self, cohort: &[u32]) -> Vec<BatchOutcome> {
        thread::scope(|scope| {
            let handles: Vec<(u32, thread::ScopedJoinHandle<'_, BatchOutcome>)> = cohort
                .iter()
                .map(|&index| {
                    let handle = scope.spawn(move || BatchTask::new(&self.config, index).run());
                    (index, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(index, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        let err = AlignError::Resource {
                            batch: index,
                            message: "worker thread panicked".to_owned(),
                        };
                        BatchOutcome::failed(index, "worker", &err)
                    })
                })
                .collect()
        })
    }

    /// Fail-fast checks: counts, model bundle, recipe, workspace root.
    fn validate(&self) -> AlignResult<Recipe> {
        if self.config.batches == 0 {
            return Err(AlignError::InvalidRequest(
                "NUM_BATCHES must be at least 1".to_owned(),
            ));
        }
        if self.config.threads == 0 {
            return Err(AlignError::InvalidRequest(
                "NUM_THREADS must be at least 1".to_owned(),
            ));
        }

        self.config.model.validate()?;
        require_file(&self.config.recipe, "recipe")?;
        if let Some(lexicon) = &self.config.lexicon {
            require_file(lexicon, "lexicon")?;
        }
        if !self.config.workspace_root.is_dir() {
            return Err(AlignError::Config(format!(
                "workspace root `{}` is not a directory",
                self.config.workspace_root.display()
            )));
        }

        Recipe::load(&self.config.recipe)
    }
}
