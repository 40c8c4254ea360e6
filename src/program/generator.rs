use crate::program::op::{Operator, Terminal};
use crate::program::{Node, Program};
use rand::Rng;

/// Tree-growing strategy of one generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthMethod {
    /// Function nodes everywhere until the depth bound, then terminals
    Full,
    /// Each node picks between a function and a terminal
    Grow,
}

/// Where constant terminals get their value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantSource {
    /// A fresh uniform draw from `[min, max]` for every constant
    Range { min: f64, max: f64 },
    /// A uniform pick from constants drawn once up front
    Pool(ConstantPool),
}

/// Non-empty set of constants, built only through [`ConstantSource::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool(Vec<f64>);

impl ConstantPool {
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl ConstantSource {
    /// Draws `size` constants from `[min, max]` into a pool, or keeps the range when `size` is 0.
    pub fn new<R: Rng + ?Sized>(min: f64, max: f64, size: usize, rng: &mut R) -> Self {
        if size == 0 {
            return ConstantSource::Range { min, max };
        }
        ConstantSource::Pool(ConstantPool((0..size).map(|_| uniform(min, max, rng)).collect()))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ConstantSource::Range { min, max } => uniform(*min, *max, rng),
            ConstantSource::Pool(pool) => pool.0[rng.random_range(0..pool.0.len())],
        }
    }
}

/// Uniform draw from `[min, max]`.
///
/// Ranges rand's sampler rejects (a width that overflows, or `min > max`) are
/// interpolated instead, so a draw never panics.
fn uniform<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    if min <= max && (max - min).is_finite() {
        rng.random_range(min..=max)
    } else {
        let t = rng.random::<f64>();
        min * (1.0 - t) + max * t
    }
}

/// Largest depth at which a full binary tree still fits in `max_size` nodes.
pub fn max_depth_for(max_size: usize) -> usize {
    // floor(log2(max_size + 1)) - 1, computed without floats
    let levels = usize::BITS - (max_size.saturating_add(1)).leading_zeros() - 1;
    (levels as usize).saturating_sub(1)
}

/// Builds random programs that never exceed a node budget.
#[derive(Debug, Clone)]
pub struct ProgramGenerator {
    variable_count: usize,
    constants: ConstantSource,
    grow_terminal_prob: f64,
    variable_prob: f64,
    min_init_depth: usize,
}

impl ProgramGenerator {
    pub fn new(
        variable_count: usize,
        constants: ConstantSource,
        grow_terminal_prob: f64,
        variable_prob: f64,
        min_init_depth: usize,
    ) -> Self {
        Self {
            variable_count,
            constants,
            grow_terminal_prob,
            variable_prob,
            min_init_depth,
        }
    }

    pub fn constants(&self) -> &ConstantSource {
        &self.constants
    }

    /// Generates the `index`-th member of an initial population using ramped half-and-half:
    /// even indices grow `Full`, odd ones `Grow`, and the depth bound cycles over
    /// `[min_init_depth, max_depth_for(max_size)]` every two individuals.
    pub fn ramped<R: Rng + ?Sized>(&self, index: usize, max_size: usize, rng: &mut R) -> Program {
        let method = if index % 2 == 0 {
            GrowthMethod::Full
        } else {
            GrowthMethod::Grow
        };
        let max_depth = max_depth_for(max_size);
        let min_depth = self.min_init_depth.min(max_depth);
        let depth = min_depth + (index / 2) % (max_depth - min_depth + 1);
        self.generate_with(method, depth, max_size, rng)
    }

    /// Generates a program of at most `max_size` nodes with the `Grow` method and
    /// the deepest bound the size allows.
    pub fn generate<R: Rng + ?Sized>(&self, max_size: usize, rng: &mut R) -> Program {
        Program::new(self.subtree(max_size, rng))
    }

    /// Same as [`ProgramGenerator::generate`] but returns a bare subtree, for mutation.
    pub fn subtree<R: Rng + ?Sized>(&self, max_size: usize, rng: &mut R) -> Node {
        self.generate_with(GrowthMethod::Grow, max_depth_for(max_size), max_size, rng)
            .into_root()
    }

    /// Generates a program with an explicit method and depth bound.
    ///
    /// A `max_size` of 0 is treated as 1: every program holds at least one node.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        method: GrowthMethod,
        max_depth: usize,
        max_size: usize,
        rng: &mut R,
    ) -> Program {
        let mut budget = max_size.max(1);
        Program::new(self.build(method, 0, max_depth, &mut budget, 0, rng))
    }

    /// `budget` counts the nodes still allowed overall and is at least `1 + pending`
    /// on entry, where `pending` is the number of sibling slots still waiting for
    /// at least one node each. A function node is only emitted when its children
    /// can each still receive a terminal; otherwise this falls back to a terminal.
    fn build<R: Rng + ?Sized>(
        &self,
        method: GrowthMethod,
        depth: usize,
        max_depth: usize,
        budget: &mut usize,
        pending: usize,
        rng: &mut R,
    ) -> Node {
        let op = Operator::ALL[rng.random_range(0..Operator::ALL.len())];
        let fits = depth < max_depth && *budget >= 1 + op.arity() + pending;
        let branch = fits
            && match method {
                GrowthMethod::Full => true,
                GrowthMethod::Grow => rng.random::<f64>() >= self.grow_terminal_prob,
            };
        *budget -= 1;

        if !branch {
            return Node::Terminal(self.random_terminal(rng));
        }

        let arity = op.arity();
        let mut children = Vec::with_capacity(arity);
        for k in 0..arity {
            let siblings_left = arity - 1 - k;
            children.push(self.build(
                method,
                depth + 1,
                max_depth,
                budget,
                pending + siblings_left,
                rng,
            ));
        }
        Node::Function(op, children)
    }

    pub fn random_terminal<R: Rng + ?Sized>(&self, rng: &mut R) -> Terminal {
        if self.variable_count > 0 && rng.random::<f64>() < self.variable_prob {
            Terminal::Variable(rng.random_range(0..self.variable_count))
        } else {
            Terminal::Constant(self.constants.sample(rng))
        }
    }
}
