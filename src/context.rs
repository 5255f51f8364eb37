use std::path::{Path, PathBuf};

/// Settings shared by every stage of a step launch
#[derive(Clone)]
pub struct Context {
    /// Echo the external command and its output
    pub verbose: bool,

    /// Print the command line instead of staging and running it
    pub dry_run: bool,

    /// Path to the step manifest
    pub manifest_path: PathBuf,

    /// Directory containing the step manifest; relative IO paths resolve here
    pub base_dir: PathBuf,
}

impl Context {
    pub fn new(manifest_path: PathBuf, verbose: bool) -> Self {
        let base_dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            verbose,
            dry_run: false,
            manifest_path,
            base_dir,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_from_manifest() {
        let ctx = Context::new(PathBuf::from("steps/train.toml"), false);
        assert_eq!(ctx.base_dir, PathBuf::from("steps"));

        let ctx = Context::new(PathBuf::from("train.toml"), false);
        assert_eq!(ctx.base_dir, PathBuf::from("."));
    }
}
