/// Divisors with a smaller magnitude than this make protected division fall back.
pub const ZERO_DIV_EPSILON: f64 = 1e-3;
/// Result of a protected division whose divisor is too close to zero.
pub const ZERO_DIV_FALLBACK: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide, // Protected: never divides by a near-zero value.
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn arity(self) -> usize {
        2
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => protected_div(a, b),
        }
    }
}

#[inline]
pub fn protected_div(a: f64, b: f64) -> f64 {
    if b.abs() < ZERO_DIV_EPSILON {
        ZERO_DIV_FALLBACK
    } else {
        a / b
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terminal {
    /// Index into a fitness case's inputs
    Variable(usize),
    Constant(f64),
}
