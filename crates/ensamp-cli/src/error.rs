use ensamp::core::grid::BuildError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup error: {0}")]
    Logging(String),
}
