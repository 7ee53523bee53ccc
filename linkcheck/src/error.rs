use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkCheckError {
    #[error("site root {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("failed to determine the working directory")]
    CurrentDir(#[source] io::Error),

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LinkCheckError>;
