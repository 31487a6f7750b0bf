use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid time `{0}`")]
    Format(String),

    #[error("invalid date `{0}`")]
    Date(String),
}

pub type Result<T> = std::result::Result<T, Error>;
