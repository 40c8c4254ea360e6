//! Tree-based genetic programming for symbolic regression.
//!
//! An [`EvolutionEngine`] loads fitness cases from a text file, grows a random
//! population of expression trees and improves it one generation at a time with
//! tournament selection, subtree crossover, subtree mutation and elitism.
//!
//! ```no_run
//! use arbor_gp::{EngineConfig, EvolutionEngine};
//! use std::path::Path;
//!
//! let config = EngineConfig { pop_size: 500, ..EngineConfig::default() };
//! let mut engine = EvolutionEngine::init(Path::new("data/double.dat"), config)?;
//! for _ in 0..50 {
//!     engine.evolve();
//! }
//! println!("{}", engine.render(engine.best(), 2)?);
//! # Ok::<(), arbor_gp::EngineError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod program;

pub use config::{Config, ConfigError, EngineConfig, RunConfig};
pub use data::{load_dataset, Dataset, DatasetError, FitnessCase};
pub use error::EngineError;
pub use evolution::{EvolutionEngine, GenerationStats, Individual, Population};
pub use program::render::RenderedText;
pub use program::{Node, Program};
