use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};

/// Artifact suffixes every acoustic model bundle must provide.
///
/// `ph` phoneme inventory, `mc` mixture coefficients, `gk` Gaussian kernel
/// data, `cfg` feature configuration, `gcl` Gaussian-cluster index.
pub const REQUIRED_SUFFIXES: [&str; 5] = ["ph", "mc", "gk", "cfg", "gcl"];

/// Suffix of the optional duration model, required only when enabled.
pub const DURATION_SUFFIX: &str = "dur";

/// An acoustic model identified by its basename, e.g. `models/finnish_16k`
/// stands for `models/finnish_16k.ph`, `.mc`, `.gk`, `.cfg`, `.gcl` and
/// optionally `.dur`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub basename: PathBuf,
    pub duration_model: bool,
}

impl ModelBundle {
    #[must_use]
    pub fn new(basename: impl Into<PathBuf>, duration_model: bool) -> Self {
        Self {
            basename: basename.into(),
            duration_model,
        }
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        let mut path = self.basename.clone().into_os_string();
        path.push(".");
        path.push(suffix);
        PathBuf::from(path)
    }

    /// Phoneme inventory (`<basename>.ph`), consumed by the segmentation stage.
    #[must_use]
    pub fn phoneme_inventory(&self) -> PathBuf {
        self.artifact("ph")
    }

    /// Feature configuration (`<basename>.cfg`), consumed by the likelihood stage.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.artifact("cfg")
    }

    /// Gaussian-cluster index (`<basename>.gcl`), consumed by the likelihood stage.
    #[must_use]
    pub fn cluster_index(&self) -> PathBuf {
        self.artifact("gcl")
    }

    /// Duration model (`<basename>.dur`), present only when enabled.
    #[must_use]
    pub fn duration_file(&self) -> Option<PathBuf> {
        self.duration_model.then(|| self.artifact(DURATION_SUFFIX))
    }

    /// Check that every required artifact exists on disk.
    ///
    /// Returns the first missing path as a fatal configuration error. Must
    /// run to completion before any batch is scheduled; a missing artifact
    /// aborts the whole run rather than failing per batch.
    pub fn validate(&self) -> AlignResult<()> {
        let mut required: Vec<PathBuf> =
            REQUIRED_SUFFIXES.iter().map(|s| self.artifact(s)).collect();
        if let Some(dur) = self.duration_file() {
            required.push(dur);
        }
        for path in required {
            if !path.exists() {
                return Err(AlignError::MissingArtifact(path));
            }
        }
        Ok(())
    }
}

/// What happened to one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    Failed,
}

/// Failure detail for a single batch, kept alongside the run report instead
/// of aborting the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch: u32,
    pub stage: String,
    pub error_code: String,
    pub message: String,
}

/// Outcome of one batch task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch: u32,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BatchFailure>,
}

impl BatchOutcome {
    #[must_use]
    pub fn ok(batch: u32) -> Self {
        Self {
            batch,
            status: BatchStatus::Ok,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(batch: u32, stage: &str, error: &AlignError) -> Self {
        Self {
            batch,
            status: BatchStatus::Failed,
            failure: Some(BatchFailure {
                batch,
                stage: stage.to_owned(),
                error_code: error.error_code().to_owned(),
                message: error.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == BatchStatus::Ok
    }
}

/// Aggregated result of a full alignment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at_rfc3339: String,
    pub finished_at_rfc3339: String,
    pub model: PathBuf,
    pub recipe: PathBuf,
    pub utterances: usize,
    pub batches: u32,
    pub threads: u32,
    pub cohorts: u32,
    pub outcomes: Vec<BatchOutcome>,
}

impl RunReport {
    /// Failures across all cohorts, in batch order.
    #[must_use]
    pub fn failures(&self) -> Vec<&BatchFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure.as_ref())
            .collect()
    }

    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(BatchOutcome::is_ok)
    }
}

/// Check that a path exists, mapping absence to a configuration error.
pub fn require_file(path: &Path, what: &str) -> AlignResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(AlignError::Config(format!(
            "{what} `{}` not found",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").expect("write fixture");
    }

    fn bundle_with_suffixes(dir: &Path, suffixes: &[&str]) -> ModelBundle {
        let basename = dir.join("am");
        for suffix in suffixes {
            touch(&dir.join(format!("am.{suffix}")));
        }
        ModelBundle::new(basename, false)
    }

    #[test]
    fn artifact_paths_append_suffix_to_basename() {
        let bundle = ModelBundle::new("models/foo", true);
        assert_eq!(bundle.phoneme_inventory(), PathBuf::from("models/foo.ph"));
        assert_eq!(bundle.config_file(), PathBuf::from("models/foo.cfg"));
        assert_eq!(bundle.cluster_index(), PathBuf::from("models/foo.gcl"));
        assert_eq!(
            bundle.duration_file(),
            Some(PathBuf::from("models/foo.dur"))
        );
    }

    #[test]
    fn duration_file_absent_when_disabled() {
        let bundle = ModelBundle::new("foo", false);
        assert_eq!(bundle.duration_file(), None);
    }

    #[test]
    fn validate_accepts_complete_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bundle = bundle_with_suffixes(dir.path(), &REQUIRED_SUFFIXES);
        bundle.validate().expect("complete bundle should validate");
    }

    #[test]
    fn validate_names_first_missing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Everything except the Gaussian kernels.
        let bundle = bundle_with_suffixes(dir.path(), &["ph", "mc", "cfg", "gcl"]);
        let err = bundle.validate().expect_err("missing gk should fail");
        match err {
            AlignError::MissingArtifact(path) => {
                assert!(path.to_string_lossy().ends_with("am.gk"), "got {path:?}");
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_duration_model_only_when_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bundle = bundle_with_suffixes(dir.path(), &REQUIRED_SUFFIXES);
        bundle.validate().expect("dur not required when disabled");

        bundle.duration_model = true;
        let err = bundle.validate().expect_err("dur required when enabled");
        match err {
            AlignError::MissingArtifact(path) => {
                assert!(path.to_string_lossy().ends_with("am.dur"));
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }

        touch(&dir.path().join("am.dur"));
        bundle.validate().expect("dur present now");
    }

    #[test]
    fn require_file_reports_what_is_missing() {
        let err = require_file(Path::new("/nonexistent/corpus.recipe"), "recipe")
            .expect_err("should fail");
        let text = err.to_string();
        assert!(text.contains("recipe"));
        assert!(text.contains("corpus.recipe"));
    }

    #[test]
    fn run_report_collects_failures_in_order() {
        let boom = AlignError::Config("boom".to_owned());
        let report = RunReport {
            started_at_rfc3339: "2026-08-27T00:00:00Z".to_owned(),
            finished_at_rfc3339: "2026-08-27T00:01:00Z".to_owned(),
            model: PathBuf::from("am"),
            recipe: PathBuf::from("corpus.recipe"),
            utterances: 10,
            batches: 3,
            threads: 2,
            cohorts: 2,
            outcomes: vec![
                BatchOutcome::ok(1),
                BatchOutcome::failed(2, "likelihood", &boom),
                BatchOutcome::failed(3, "segmentation", &boom),
            ],
        };
        assert!(!report.all_ok());
        let failures = report.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].batch, 2);
        assert_eq!(failures[0].stage, "likelihood");
        assert_eq!(failures[1].batch, 3);
    }

    #[test]
    fn batch_outcome_serializes_without_null_failure() {
        let json = serde_json::to_string(&BatchOutcome::ok(4)).expect("serialize");
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("failure"));
    }
}
