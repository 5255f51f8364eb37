use crate::blocks::{BlockKind, BuildingBlock};
use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Step manifest as written on disk
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepManifest {
    pub block: BlockKind,

    #[serde(default)]
    pub common: CommonProperties,

    /// Block specific input and output paths
    #[serde(default)]
    pub io: toml::Table,

    /// Block specific properties
    #[serde(default)]
    pub properties: toml::Table,
}

/// Settings shared by every block
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct CommonProperties {
    /// Interpreter running the BioML modules
    pub executable: String,

    /// Directory receiving the per-launch working directories
    pub sandbox_path: PathBuf,

    /// Delete the working directory once the step has finished
    pub remove_tmp: bool,
}

impl Default for CommonProperties {
    fn default() -> Self {
        Self {
            executable: "python".to_string(),
            sandbox_path: PathBuf::from("."),
            remove_tmp: true,
        }
    }
}

/// Parsed and validated step
pub struct Manifest {
    pub common: CommonProperties,
    pub block: Box<dyn BuildingBlock>,
}

impl Manifest {
    /// Load and parse the step manifest referenced by `ctx`
    pub fn load(ctx: &Context) -> Result<Self> {
        if !ctx.manifest_path.is_file() {
            return Err(Error::InvalidManifest(format!(
                "Manifest not found at {}",
                ctx.manifest_path.display()
            )));
        }

        let content = fs::read_to_string(&ctx.manifest_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let step: StepManifest = toml::from_str(content)?;

        if step.common.executable.trim().is_empty() {
            return Err(Error::InvalidManifest(
                "common.executable must not be empty".to_string(),
            ));
        }

        let block = step.block.build(step.io, step.properties)?;

        Ok(Manifest {
            common: step.common,
            block,
        })
    }
}
