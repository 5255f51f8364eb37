pub mod ensemble;
pub mod feature_extraction;
pub mod feature_selection;
pub mod generate_model;
pub mod generate_pssm;
pub mod model_training;
pub mod outlier;
pub mod predict;

use crate::result::Result;
use crate::stage::Stage;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};

pub use ensemble::Ensemble;
pub use feature_extraction::FeatureExtraction;
pub use feature_selection::FeatureSelection;
pub use generate_model::GenerateModel;
pub use generate_pssm::GeneratePssm;
pub use model_training::ModelTraining;
pub use outlier::Outlier;
pub use predict::Predict;

/// One wrapper around a module of the BioML toolkit
pub trait BuildingBlock {
    /// Module name, invoked as `BioML.<name>`
    fn name(&self) -> &'static str;

    /// Declared input files as (io key, host path)
    fn inputs(&self) -> Vec<(&'static str, &Path)>;

    /// Declared output files as (io key, host path)
    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        Vec::new()
    }

    /// Where the tool leaves output `key` inside the working directory
    fn staged_output(&self, _key: &str, unique_dir: &Path, host: &Path) -> PathBuf {
        unique_dir.join(host.file_name().unwrap_or(host.as_os_str()))
    }

    /// Work on the staged inputs before the tool runs
    fn prepare(&self, _stage: &Stage) -> Result<()> {
        Ok(())
    }

    /// Arguments passed to the module
    fn arguments(&self, stage: &Stage) -> Result<Vec<String>>;

    /// Archive to build once the tool has finished
    fn archive(&self, _stage: &Stage) -> Result<Option<ArchiveRequest>> {
        Ok(None)
    }
}

/// Sources to pack into `destination` after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Block selector of a step manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    FeatureExtraction,
    FeatureSelection,
    Outlier,
    ModelTraining,
    GenerateModel,
    Ensemble,
    Predict,
    GeneratePssm,
}

impl BlockKind {
    /// Build the typed block from the `[io]` and `[properties]` tables
    pub fn build(self, io: toml::Table, properties: toml::Table) -> Result<Box<dyn BuildingBlock>> {
        let block: Box<dyn BuildingBlock> = match self {
            BlockKind::FeatureExtraction => Box::new(FeatureExtraction {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::FeatureSelection => Box::new(FeatureSelection {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::Outlier => Box::new(Outlier {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::ModelTraining => Box::new(ModelTraining {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::GenerateModel => Box::new(GenerateModel {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::Ensemble => Box::new(Ensemble {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::Predict => Box::new(Predict {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
            BlockKind::GeneratePssm => Box::new(GeneratePssm {
                io: parse(io)?,
                properties: parse(properties)?,
            }),
        };
        Ok(block)
    }
}

fn parse<T: DeserializeOwned>(table: toml::Table) -> Result<T> {
    Ok(toml::Value::Table(table).try_into::<T>()?)
}

/// Feature scaler used by the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaler {
    #[default]
    Robust,
    Standard,
    Minmax,
}

impl fmt::Display for Scaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scaler::Robust => "robust",
            Scaler::Standard => "standard",
            Scaler::Minmax => "minmax",
        };
        write!(f, "{}", s)
    }
}

/// Accumulates flags for the properties that are set
#[derive(Debug, Default)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always emit `flag value`
    pub fn arg<T: fmt::Display>(mut self, flag: &str, value: T) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.to_string());
        self
    }

    /// Emit `flag value` when a value is present
    pub fn opt<T: fmt::Display>(self, flag: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.arg(flag, value),
            None => self,
        }
    }

    /// Emit the bare flag when set
    pub fn switch(mut self, flag: &str, on: bool) -> Self {
        if on {
            self.args.push(flag.to_string());
        }
        self
    }

    /// Emit `flag` followed by each item of a comma separated list
    pub fn list(mut self, flag: &str, items: Option<&str>) -> Self {
        if let Some(items) = items {
            self.args.push(flag.to_string());
            self.args.extend(
                items
                    .split(',')
                    .map(str::trim)
                    .filter(|i| !i.is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}
