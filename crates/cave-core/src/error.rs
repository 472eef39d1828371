//! 核心错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Reference station not found: {0}")]
    ReferenceNotFound(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("No plan or section table supplied")]
    NoInput,

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
