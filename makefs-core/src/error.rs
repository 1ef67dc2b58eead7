use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsdataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("unable to derive a unique symbol for \"{0}\"")]
    NamingExhausted(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, FsdataError>;
