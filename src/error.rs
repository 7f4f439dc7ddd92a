use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DidactError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Content source error: {0}")]
    Source(String),
}

impl From<toml::de::Error> for DidactError {
    fn from(src: toml::de::Error) -> DidactError {
        DidactError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for DidactError {
    fn from(src: toml::ser::Error) -> DidactError {
        DidactError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for DidactError {
    fn from(src: JsonError) -> DidactError {
        DidactError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for DidactError {
    fn from(src: UrlParseError) -> DidactError {
        DidactError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<io::Error> for DidactError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DidactError::NotFound(format!("{x}")),
            _ => DidactError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for DidactError {
    fn from(x: fmt::Error) -> Self {
        DidactError::Custom(format!("{x}"))
    }
}

impl From<walkdir::Error> for DidactError {
    fn from(x: walkdir::Error) -> Self {
        DidactError::Source(format!("Directory walk failed: {x}"))
    }
}
