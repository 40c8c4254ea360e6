pub mod operators;
pub mod selection;

use crate::config::EngineConfig;
use crate::data::{load_dataset, Dataset};
use crate::error::EngineError;
use crate::evaluation::evaluate;
use crate::evolution::operators::{crossover, mutate};
use crate::evolution::selection::{best_index, tournament};
use crate::program::generator::{ConstantSource, ProgramGenerator};
use crate::program::render::{render, render_into, RenderedText};
use crate::program::Program;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::path::Path;
use std::sync::Arc;

/// Fitness placeholder of an individual whose program has not been scored yet.
/// The evaluator itself never returns it: its worst score is `-f64::MAX`.
const UNEVALUATED: f64 = f64::NEG_INFINITY;

/// A program together with its cached fitness and node count.
#[derive(Debug, Clone)]
pub struct Individual {
    program: Program,
    fitness: f64,
    size: usize,
}

impl Individual {
    /// Wraps a freshly built program; its fitness is computed later.
    pub fn new(program: Program) -> Self {
        let size = program.size();
        Self {
            program,
            fitness: UNEVALUATED,
            size,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNEVALUATED
    }
}

/// Fixed-length, fully evaluated generation of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
    /// Index of the fittest individual, ties going to the lowest index
    best_index: usize,
}

impl Population {
    /// Scores every individual still lacking a fitness, then locates the best one.
    fn evaluated(mut individuals: Vec<Individual>, dataset: &Dataset) -> Self {
        let mut scored = 0;
        for individual in individuals.iter_mut().filter(|ind| !ind.is_evaluated()) {
            individual.fitness = evaluate(&individual.program, dataset);
            scored += 1;
        }
        debug!("Evaluated {} of {} individuals", scored, individuals.len());

        let fitness: Vec<f64> = individuals.iter().map(Individual::fitness).collect();
        Self {
            best_index: best_index(&fitness),
            individuals,
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn best_index(&self) -> usize {
        self.best_index
    }

    pub fn best(&self) -> &Individual {
        &self.individuals[self.best_index]
    }

    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(Individual::fitness).collect()
    }

    /// Indices of the `count` fittest individuals, best first, ties by lowest index.
    fn elite_indices(&self, count: usize) -> Vec<usize> {
        if count == 1 {
            return vec![self.best_index];
        }
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        // Stable sort keeps lower indices first among equal fitness
        order.sort_by(|&a, &b| {
            self.individuals[b]
                .fitness
                .total_cmp(&self.individuals[a].fitness)
        });
        order.truncate(count);
        order
    }
}

/// Summary of the current generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_index: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub average_size: f64,
}

/// Generational GP engine: owns its population and random stream, shares the dataset.
///
/// Construction is all-or-nothing: either a fully evaluated initial population
/// exists or an error is returned. Two engines built from the same dataset,
/// configuration and seed evolve identically.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    config: EngineConfig,
    dataset: Arc<Dataset>,
    generator: ProgramGenerator,
    population: Population,
    rng: Pcg64,
    generation: usize,
}

impl EvolutionEngine {
    /// Loads the dataset at `path` and builds an engine over it.
    ///
    /// # Errors
    /// `EngineError::Dataset` when the file cannot be loaded, `EngineError::Config`
    /// when `config` is invalid. No engine exists in either case.
    pub fn init(path: &Path, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let dataset = load_dataset(path)?;
        info!(
            "Loaded {} fitness cases over {} variables from '{}'",
            dataset.len(),
            dataset.variable_count(),
            path.display()
        );
        Self::new(config, Arc::new(dataset))
    }

    /// Builds an engine over an already loaded dataset and evaluates its initial population.
    ///
    /// The population is produced by ramped half-and-half generation. When the dataset
    /// declares a constant pool, the pool is drawn first from the engine's own stream.
    pub fn new(config: EngineConfig, dataset: Arc<Dataset>) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = Pcg64::seed_from_u64(config.seed);

        let constants = ConstantSource::new(
            dataset.random_min(),
            dataset.random_max(),
            dataset.constant_pool_size(),
            &mut rng,
        );
        let generator = ProgramGenerator::new(
            dataset.variable_count(),
            constants,
            config.grow_terminal_prob,
            config.variable_prob,
            config.min_init_depth,
        );

        info!(
            "Initializing population of size {} (max program size {})...",
            config.pop_size, config.max_program_size
        );
        let individuals = (0..config.pop_size)
            .map(|i| Individual::new(generator.ramped(i, config.max_program_size, &mut rng)))
            .collect();
        let population = Population::evaluated(individuals, &dataset);

        Ok(Self {
            config,
            dataset,
            generator,
            population,
            rng,
            generation: 0,
        })
    }

    /// Advances the population by one generation.
    ///
    /// The `elite_count` best individuals are carried over unchanged into the first
    /// slots; every other slot receives an offspring of crossover (with probability
    /// `crossover_prob`, two tournament winners) or mutation (one tournament winner).
    /// The new generation replaces the old one only once it is fully evaluated.
    pub fn evolve(&mut self) {
        let pop_size = self.config.pop_size;
        let fitness = self.population.fitness_values();

        let mut next_generation: Vec<Individual> = Vec::with_capacity(pop_size);
        if self.config.elite_count > 0 {
            next_generation.extend(
                self.population
                    .elite_indices(self.config.elite_count)
                    .into_iter()
                    .map(|i| self.population.individuals[i].clone()),
            );
        }

        while next_generation.len() < pop_size {
            let offspring = if self.rng.random::<f64>() < self.config.crossover_prob {
                let a = tournament(&fitness, self.config.tournament_size, &mut self.rng);
                let b = tournament(&fitness, self.config.tournament_size, &mut self.rng);
                crossover(
                    &self.population.individuals[a].program,
                    &self.population.individuals[b].program,
                    self.config.max_program_size,
                    self.config.crossover_attempts,
                    &mut self.rng,
                )
            } else {
                let parent = tournament(&fitness, self.config.tournament_size, &mut self.rng);
                mutate(
                    &self.population.individuals[parent].program,
                    self.config.node_mutation_prob,
                    &self.generator,
                    self.config.max_program_size,
                    &mut self.rng,
                )
            };
            next_generation.push(Individual::new(offspring));
        }

        self.population = Population::evaluated(next_generation, &self.dataset);
        self.generation += 1;

        let stats = self.stats();
        info!(
            "Gen {}: Best Fitness={:.6} | Avg Fitness={:.2} | Avg Size={:.1}",
            stats.generation, stats.best_fitness, stats.average_fitness, stats.average_size
        );
    }

    /// Index of the fittest individual (lowest index among equals).
    pub fn best(&self) -> usize {
        self.population.best_index()
    }

    pub fn fitness(&self, index: usize) -> Result<f64, EngineError> {
        self.individual(index).map(Individual::fitness)
    }

    /// Node count of the `index`-th program.
    pub fn size(&self, index: usize) -> Result<usize, EngineError> {
        self.individual(index).map(Individual::size)
    }

    pub fn render(&self, index: usize, float_precision: usize) -> Result<String, EngineError> {
        self.individual(index)
            .map(|ind| render(&ind.program, float_precision))
    }

    /// Renders into `out` as NUL-terminated text, truncating when it does not fit.
    pub fn render_into(
        &self,
        index: usize,
        float_precision: usize,
        out: &mut [u8],
    ) -> Result<RenderedText, EngineError> {
        self.individual(index)
            .map(|ind| render_into(&ind.program, float_precision, out))
    }

    pub fn individual(&self, index: usize) -> Result<&Individual, EngineError> {
        self.population.get(index).ok_or(EngineError::IndexOutOfRange {
            index,
            pop_size: self.population.len(),
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of completed `evolve` calls.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn stats(&self) -> GenerationStats {
        // Running mean: a plain sum of very negative fitness values could overflow
        let mut average_fitness = 0.0;
        let mut total_size = 0usize;
        for (k, ind) in self.population.individuals.iter().enumerate() {
            average_fitness += (ind.fitness - average_fitness) / (k + 1) as f64;
            total_size += ind.size;
        }
        let best = self.population.best();
        GenerationStats {
            generation: self.generation,
            best_index: self.population.best_index(),
            best_fitness: best.fitness,
            average_fitness,
            average_size: total_size as f64 / self.population.len() as f64,
        }
    }
}
