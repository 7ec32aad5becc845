use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Limit error: {0}")]
    Limit(String),

    #[error("Scanner error: {0}")]
    Scanner(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
