use crate::config::ConfigError;
use crate::data::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Individual index {index} is out of range for a population of {pop_size}")]
    IndexOutOfRange { index: usize, pop_size: usize },
}
