use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Manifest parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Timestamp format error: {0}")]
    Time(#[from] time::error::Format),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Missing input file: {0}")]
    MissingInput(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }
}
