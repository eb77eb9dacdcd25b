use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an aggregation or plotting run.
///
/// Every variant names the path it was raised for; there is no partial
/// result mode.
#[derive(Debug, Error)]
pub enum Error {
    #[error("size label {label:?} at {} has no integer prefix", path.display())]
    MalformedSizeLabel { path: PathBuf, label: String },

    #[error("no timing samples found in {}", path.display())]
    NoSamplesFound { path: PathBuf },

    #[error("unparseable timing sample {token:?} on line {line} of {}", path.display())]
    MalformedSample {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("unknown satisfiability class {name:?} at {}", path.display())]
    UnknownClass { path: PathBuf, name: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render chart to {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Render {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
