use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Probability '{name}' must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Population size must be at least 1")]
    EmptyPopulation,
    #[error("Maximum program size must be at least 1")]
    ZeroProgramSize,
    #[error("Tournament size {size} is outside [1, {pop_size}]")]
    TournamentSizeOutOfRange { size: usize, pop_size: usize },
    #[error("Elite count {count} exceeds population size {pop_size}")]
    EliteCountOutOfRange { count: usize, pop_size: usize },
    #[error("Crossover must be allowed at least one attempt")]
    ZeroCrossoverAttempts,
}

/// Immutable parameter snapshot of one evolution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pop_size: usize,
    /// Upper bound on the node count of every program in the population
    pub max_program_size: usize,
    /// Chance that any single node is replaced during mutation
    pub node_mutation_prob: f64,
    /// Chance that an offspring slot is filled by crossover rather than mutation
    pub crossover_prob: f64,
    pub tournament_size: usize,
    pub seed: u64,
    /// Number of best individuals copied unmodified into the next generation
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    /// Node-pair draws crossover makes before giving up on an oversized child
    #[serde(default = "default_crossover_attempts")]
    pub crossover_attempts: usize,
    /// Chance that a "grow" node stops at a terminal
    #[serde(default = "default_half")]
    pub grow_terminal_prob: f64,
    /// Chance that a terminal is a variable rather than a constant
    #[serde(default = "default_half")]
    pub variable_prob: f64,
    /// Shallowest depth of the ramped half-and-half schedule
    #[serde(default = "default_min_init_depth")]
    pub min_init_depth: usize,
}

fn default_elite_count() -> usize {
    1
}

fn default_crossover_attempts() -> usize {
    8
}

fn default_half() -> f64 {
    0.5
}

fn default_min_init_depth() -> usize {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pop_size: 10_000,
            max_program_size: 100,
            node_mutation_prob: 0.05,
            crossover_prob: 0.9,
            tournament_size: 2,
            seed: 42,
            elite_count: default_elite_count(),
            crossover_attempts: default_crossover_attempts(),
            grow_terminal_prob: default_half(),
            variable_prob: default_half(),
            min_init_depth: default_min_init_depth(),
        }
    }
}

impl EngineConfig {
    /// Checks every parameter against the constraints the engine relies on.
    ///
    /// # Returns
    /// * `Result<(), ConfigError>` - the first violated constraint, if any
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("node_mutation_prob", self.node_mutation_prob),
            ("crossover_prob", self.crossover_prob),
            ("grow_terminal_prob", self.grow_terminal_prob),
            ("variable_prob", self.variable_prob),
        ];
        for (name, value) in probabilities {
            // NaN fails the range check as well
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if self.pop_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.max_program_size == 0 {
            return Err(ConfigError::ZeroProgramSize);
        }
        if self.tournament_size == 0 || self.tournament_size > self.pop_size {
            return Err(ConfigError::TournamentSizeOutOfRange {
                size: self.tournament_size,
                pop_size: self.pop_size,
            });
        }
        if self.elite_count > self.pop_size {
            return Err(ConfigError::EliteCountOutOfRange {
                count: self.elite_count,
                pop_size: self.pop_size,
            });
        }
        if self.crossover_attempts == 0 {
            return Err(ConfigError::ZeroCrossoverAttempts);
        }
        Ok(())
    }
}

/// Settings for the runner loop driving an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_num_generations")]
    pub num_generations: usize,
    /// The run stops once the best fitness rises above `-convergence_threshold`
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: f64,
    #[serde(default = "default_float_precision")]
    pub float_precision: usize,
}

fn default_num_generations() -> usize {
    100
}

fn default_convergence_threshold() -> f64 {
    1e-6
}

fn default_float_precision() -> usize {
    2
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_generations: default_num_generations(),
            convergence_threshold: default_convergence_threshold(),
            float_precision: default_float_precision(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub data_file: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }
}
