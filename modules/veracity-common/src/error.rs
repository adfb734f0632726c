use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeracityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),
}
