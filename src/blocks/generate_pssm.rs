use super::{ArchiveRequest, BuildingBlock, CommandLine};
use crate::result::Result;
use crate::stage::Stage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratePssmIo {
    pub input_fasta: PathBuf,
    /// Zip receiving the whole working directory
    pub output_pssm: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratePssmProperties {
    /// Fasta used to build the BLAST database
    pub dbinp: Option<String>,
    /// Name of the BLAST database
    pub dbout: Option<String>,
    pub num_thread: Option<u32>,
    /// Sequences per split fasta file
    pub number: Option<u32>,
    /// PSI-BLAST iterations
    pub iterations: Option<u32>,
    pub possum_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratePssm {
    pub io: GeneratePssmIo,
    pub properties: GeneratePssmProperties,
}

impl BuildingBlock for GeneratePssm {
    fn name(&self) -> &'static str {
        "generate_pssm"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("input_fasta", self.io.input_fasta.as_path())]
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("output_pssm", self.io.output_pssm.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("-i", stage.input("input_fasta")?.display())
            .opt("--dbinp", p.dbinp.as_deref())
            .opt("--dbout", p.dbout.as_deref())
            .opt("--num_thread", p.num_thread)
            .opt("--number", p.number)
            .opt("--iterations", p.iterations)
            .opt("--possum_dir", p.possum_dir.as_deref())
            .into_vec())
    }

    fn archive(&self, stage: &Stage) -> Result<Option<ArchiveRequest>> {
        Ok(Some(ArchiveRequest {
            destination: stage.host_output("output_pssm")?.to_path_buf(),
            sources: vec![stage.unique_dir.clone()],
        }))
    }
}
