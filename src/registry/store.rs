//! Directory-backed tracking store and model registry.
//!
//! ```text
//! <root>/
//!   experiments/<experiment>/<run_id>/
//!     run.json
//!     metrics.json
//!     artifacts/<artifact>/pipeline.json
//!     artifacts/<artifact>/input_example.json
//!   models/<name>/version-<n>/
//!     model.json
//!     pipeline.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::RegistryError;
use super::uri::{ModelUri, VersionSpec};
use super::{ExperimentTracker, InputExample, ModelRegistry, ModelVersion, RunInfo, RunStatus};
use crate::pipeline::FittedModelPipeline;

const EXPERIMENTS_DIR: &str = "experiments";
const MODELS_DIR: &str = "models";
const ARTIFACTS_DIR: &str = "artifacts";
const RUN_FILE: &str = "run.json";
const METRICS_FILE: &str = "metrics.json";
const PIPELINE_FILE: &str = "pipeline.json";
const INPUT_EXAMPLE_FILE: &str = "input_example.json";
const MODEL_VERSION_FILE: &str = "model.json";
const VERSION_PREFIX: &str = "version-";

/// Tracking store and registry rooted at a single directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open an existing store; a missing root is an error
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RegistryError::StoreNotFound(root));
        }
        Ok(Self { root })
    }

    /// Open the store at `root`, creating the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        create_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_dir(&self, run: &RunInfo) -> PathBuf {
        self.root
            .join(EXPERIMENTS_DIR)
            .join(&run.experiment)
            .join(&run.run_id)
    }

    fn artifacts_dir(&self, run: &RunInfo) -> PathBuf {
        self.run_dir(run).join(ARTIFACTS_DIR)
    }

    fn model_dir(&self, name: &str) -> PathBuf {
        self.root.join(MODELS_DIR).join(name)
    }

    fn version_dir(&self, name: &str, version: u32) -> PathBuf {
        self.model_dir(name).join(format!("{}{}", VERSION_PREFIX, version))
    }

    /// Locate a run directory by id across all experiments
    fn find_run_dir(&self, run_id: &str) -> Result<PathBuf, RegistryError> {
        let experiments = self.root.join(EXPERIMENTS_DIR);
        if experiments.is_dir() {
            for entry in read_dir(&experiments)? {
                let candidate = entry.join(run_id);
                if candidate.join(RUN_FILE).is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(RegistryError::RunNotFound(run_id.to_string()))
    }

    pub fn get_run(&self, run_id: &str) -> Result<RunInfo, RegistryError> {
        read_json(&self.find_run_dir(run_id)?.join(RUN_FILE))
    }

    pub fn get_metrics(&self, run_id: &str) -> Result<BTreeMap<String, f64>, RegistryError> {
        let path = self.find_run_dir(run_id)?.join(METRICS_FILE);
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        read_json(&path)
    }

    pub fn load_input_example(
        &self,
        run_id: &str,
        artifact: &str,
    ) -> Result<InputExample, RegistryError> {
        let path = self.run_artifact_dir(run_id, artifact)?.join(INPUT_EXAMPLE_FILE);
        read_json(&path)
    }

    fn run_artifact_dir(&self, run_id: &str, artifact: &str) -> Result<PathBuf, RegistryError> {
        let dir = self.find_run_dir(run_id)?.join(ARTIFACTS_DIR).join(artifact);
        if !dir.join(PIPELINE_FILE).is_file() {
            return Err(RegistryError::ArtifactNotFound {
                run_id: run_id.to_string(),
                artifact: artifact.to_string(),
            });
        }
        Ok(dir)
    }

    fn version_numbers(&self, name: &str) -> Result<Vec<u32>, RegistryError> {
        let dir = self.model_dir(name);
        if !dir.is_dir() {
            return Err(RegistryError::ModelNotFound(name.to_string()));
        }
        let mut versions: Vec<u32> = read_dir(&dir)?
            .iter()
            .filter_map(|p| p.file_name()?.to_str()?.strip_prefix(VERSION_PREFIX)?.parse().ok())
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    fn resolve_pipeline_path(&self, uri: &ModelUri) -> Result<PathBuf, RegistryError> {
        match uri {
            ModelUri::Registered { name, version } => {
                let resolved = self.get_model_version(name, *version)?;
                Ok(self.version_dir(name, resolved.version).join(PIPELINE_FILE))
            }
            ModelUri::Run { run_id, artifact } => {
                Ok(self.run_artifact_dir(run_id, artifact)?.join(PIPELINE_FILE))
            }
        }
    }
}

impl ExperimentTracker for FileStore {
    fn start_run(&self, experiment: &str, run_name: &str) -> Result<RunInfo, RegistryError> {
        let run = RunInfo {
            run_id: Uuid::new_v4().simple().to_string(),
            run_name: run_name.to_string(),
            experiment: experiment.to_string(),
            status: RunStatus::Running,
            start_time: Utc::now(),
            end_time: None,
        };
        let dir = self.run_dir(&run);
        create_dir(&dir)?;
        write_json(&dir.join(RUN_FILE), &run)?;
        info!(run_id = %run.run_id, run_name, experiment, "run started");
        Ok(run)
    }

    fn log_metrics(
        &self,
        run: &RunInfo,
        metrics: &BTreeMap<String, f64>,
    ) -> Result<(), RegistryError> {
        let path = self.run_dir(run).join(METRICS_FILE);
        let mut merged: BTreeMap<String, f64> = if path.is_file() {
            read_json(&path)?
        } else {
            BTreeMap::new()
        };
        merged.extend(metrics.iter().map(|(k, v)| (k.clone(), *v)));
        write_json(&path, &merged)?;
        debug!(run_id = %run.run_id, ?metrics, "metrics logged");
        Ok(())
    }

    fn log_json_artifact(
        &self,
        run: &RunInfo,
        file_name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, RegistryError> {
        let dir = self.artifacts_dir(run);
        create_dir(&dir)?;
        let path = dir.join(file_name);
        write_json(&path, value)?;
        Ok(path)
    }

    fn log_model(
        &self,
        run: &RunInfo,
        artifact: &str,
        pipeline: &FittedModelPipeline,
        input_example: &InputExample,
    ) -> Result<ModelUri, RegistryError> {
        let dir = self.artifacts_dir(run).join(artifact);
        create_dir(&dir)?;
        write_json(&dir.join(PIPELINE_FILE), pipeline)?;
        write_json(&dir.join(INPUT_EXAMPLE_FILE), input_example)?;

        let uri = ModelUri::run(&run.run_id, artifact);
        info!(%uri, "model logged");
        Ok(uri)
    }

    fn end_run(&self, run: &mut RunInfo, status: RunStatus) -> Result<(), RegistryError> {
        run.status = status;
        run.end_time = Some(Utc::now());
        write_json(&self.run_dir(run).join(RUN_FILE), &*run)
    }
}

impl ModelRegistry for FileStore {
    fn register_model(&self, source: &ModelUri, name: &str) -> Result<ModelVersion, RegistryError> {
        let run_id = match source {
            ModelUri::Run { run_id, .. } => run_id.clone(),
            ModelUri::Registered { .. } => return Err(RegistryError::InvalidUri(source.to_string())),
        };
        let source_pipeline = self.resolve_pipeline_path(source)?;

        let next = match self.version_numbers(name) {
            Ok(versions) => versions.last().copied().unwrap_or(0) + 1,
            Err(RegistryError::ModelNotFound(_)) => 1,
            Err(e) => return Err(e),
        };

        let dir = self.version_dir(name, next);
        create_dir(&dir)?;
        let target = dir.join(PIPELINE_FILE);
        fs::copy(&source_pipeline, &target).map_err(|source| RegistryError::Io {
            path: target.clone(),
            source,
        })?;

        let version = ModelVersion {
            name: name.to_string(),
            version: next,
            source: source.to_string(),
            run_id,
            created_at: Utc::now(),
        };
        write_json(&dir.join(MODEL_VERSION_FILE), &version)?;

        info!(name, version = next, %source, "model version registered");
        Ok(version)
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>, RegistryError> {
        self.version_numbers(name)?
            .into_iter()
            .map(|v| read_json(&self.version_dir(name, v).join(MODEL_VERSION_FILE)))
            .collect()
    }

    fn get_model_version(
        &self,
        name: &str,
        version: VersionSpec,
    ) -> Result<ModelVersion, RegistryError> {
        let versions = self.version_numbers(name)?;
        let number = match version {
            VersionSpec::Latest => versions
                .last()
                .copied()
                .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?,
            VersionSpec::Number(n) if versions.contains(&n) => n,
            VersionSpec::Number(n) => {
                return Err(RegistryError::VersionNotFound {
                    name: name.to_string(),
                    version: n,
                })
            }
        };
        read_json(&self.version_dir(name, number).join(MODEL_VERSION_FILE))
    }

    fn load_pipeline(&self, uri: &ModelUri) -> Result<FittedModelPipeline, RegistryError> {
        let path = self.resolve_pipeline_path(uri)?;
        debug!(%uri, path = %path.display(), "loading pipeline");
        read_json(&path)
    }
}

fn create_dir(path: &Path) -> Result<(), RegistryError> {
    fs::create_dir_all(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_dir(path: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let io_err = |source: std::io::Error| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::read_dir(path)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_err))
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RegistryError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
