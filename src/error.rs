use std::io;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum ClassPathError {
    #[error("class representation has neither a binary nor a source file")]
    EmptyClassRep,
    #[error("binary file {file} does not end in {suffix}")]
    BinaryName { file: String, suffix: &'static str },
    #[error("source file {file} has no recognized source extension")]
    SourceExtension { file: String },
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ZIP error while reading {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

pub type Result<T> = std::result::Result<T, ClassPathError>;
