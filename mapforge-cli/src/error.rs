//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] mapforge::config::ConfigError),

    #[error(transparent)]
    Frame(#[from] mapforge::frame::FrameError),

    #[error(transparent)]
    Plan(#[from] mapforge::tile::PlanError),

    #[error(transparent)]
    WorldFile(#[from] mapforge::frame::WorldFileError),

    #[error(transparent)]
    Proj(#[from] mapforge::proj::ProjError),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
