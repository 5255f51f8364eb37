use crate::blocks::BuildingBlock;
use crate::context::Context;
use crate::error::Error;
use crate::manifest::CommonProperties;
use crate::result::Result;
use crate::utils;
use log::debug;
use std::fs;
use std::path::{self, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use time::macros::format_description;

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
struct StagedFile {
    key: &'static str,
    host: PathBuf,
    staged: PathBuf,
}

/// Working directory of one launch and the host/staged path of every declared file
#[derive(Debug, Clone)]
pub struct Stage {
    pub unique_dir: PathBuf,
    inputs: Vec<StagedFile>,
    outputs: Vec<StagedFile>,
}

fn unique_name(block: &str) -> Result<String> {
    let stamp = OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]_[hour][minute][second]"))?;
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Ok(format!("{}_{}_{}_{}", block, stamp, std::process::id(), sequence))
}

fn find<'a>(files: &'a [StagedFile], key: &str) -> Result<&'a StagedFile> {
    files
        .iter()
        .find(|f| f.key == key)
        .ok_or_else(|| Error::custom(format!("No staged path for '{}'", key)))
}

impl Stage {
    /// Resolve every path of `block` without touching the file system
    pub fn plan(ctx: &Context, common: &CommonProperties, block: &dyn BuildingBlock) -> Result<Self> {
        let sandbox = path::absolute(utils::resolve(&ctx.base_dir, &common.sandbox_path))?;
        let unique_dir = sandbox.join(unique_name(block.name())?);

        let mut inputs: Vec<StagedFile> = Vec::new();
        for (key, host) in block.inputs() {
            let host = path::absolute(utils::resolve(&ctx.base_dir, host))?;
            let name = host
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| key.to_string());

            let mut staged = unique_dir.join(&name);
            if inputs.iter().any(|f| f.staged == staged) {
                staged = unique_dir.join(format!("{}_{}", key, name));
            }

            inputs.push(StagedFile { key, host, staged });
        }

        let mut outputs = Vec::new();
        for (key, host) in block.outputs() {
            let host = path::absolute(utils::resolve(&ctx.base_dir, host))?;
            let staged = block.staged_output(key, &unique_dir, &host);
            outputs.push(StagedFile { key, host, staged });
        }

        Ok(Self {
            unique_dir,
            inputs,
            outputs,
        })
    }

    /// Staged path of input `key`
    pub fn input(&self, key: &str) -> Result<&Path> {
        Ok(&find(&self.inputs, key)?.staged)
    }

    /// Staged path of input `key`, if the block declared it
    pub fn declared_input(&self, key: &str) -> Option<&Path> {
        find(&self.inputs, key).ok().map(|f| f.staged.as_path())
    }

    /// Staged path of output `key`
    pub fn output(&self, key: &str) -> Result<&Path> {
        Ok(&find(&self.outputs, key)?.staged)
    }

    /// Host path of output `key`
    pub fn host_output(&self, key: &str) -> Result<&Path> {
        Ok(&find(&self.outputs, key)?.host)
    }

    /// Create the working directory and copy every input into it
    pub fn stage_files(&self) -> Result<()> {
        for file in &self.inputs {
            if !file.host.exists() {
                return Err(Error::MissingInput(format!(
                    "{}: {}",
                    file.key,
                    file.host.display()
                )));
            }
        }

        utils::ensure_dir(&self.unique_dir)?;

        for file in &self.inputs {
            debug!("Staging {} to {}", file.host.display(), file.staged.display());
            utils::copy_recursively(&file.host, &file.staged)?;
        }

        Ok(())
    }

    /// Copy outputs the tool produced back to their host paths
    pub fn copy_to_host(&self) -> Result<()> {
        for file in &self.outputs {
            if !file.staged.exists() {
                debug!("{} was not produced at {}", file.key, file.staged.display());
                continue;
            }

            debug!("Copying {} to {}", file.staged.display(), file.host.display());
            utils::copy_recursively(&file.staged, &file.host)?;
        }

        Ok(())
    }

    /// Delete the working directory
    pub fn remove(&self) -> Result<()> {
        if self.unique_dir.exists() {
            debug!("Removing {}", self.unique_dir.display());
            fs::remove_dir_all(&self.unique_dir)?;
        }
        Ok(())
    }
}
