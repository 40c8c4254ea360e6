use crate::data::{Dataset, FitnessCase};
use crate::program::op::Terminal;
use crate::program::{Node, Program};

/// Error charged for a fitness case whose prediction (or error) is not finite.
/// No finite error exceeds it, so a broken program never outranks a working one.
pub const NON_FINITE_ERROR: f64 = f64::MAX;

/// Interprets `node` against one set of inputs.
///
/// A variable index past the end of `inputs` reads as NaN, which the fitness
/// evaluator then charges as a non-finite prediction.
pub fn interpret(node: &Node, inputs: &[f64]) -> f64 {
    match node {
        Node::Terminal(Terminal::Variable(i)) => inputs.get(*i).copied().unwrap_or(f64::NAN),
        Node::Terminal(Terminal::Constant(c)) => *c,
        Node::Function(op, children) => match children.as_slice() {
            [lhs, rhs] => op.apply(interpret(lhs, inputs), interpret(rhs, inputs)),
            _ => f64::NAN,
        },
    }
}

/// Absolute error of `program` on a single case, with non-finite results replaced by
/// [`NON_FINITE_ERROR`].
pub fn case_error(program: &Program, case: &FitnessCase) -> f64 {
    let predicted = interpret(program.root(), &case.inputs);
    let error = (predicted - case.target).abs();
    if error.is_finite() {
        error
    } else {
        NON_FINITE_ERROR
    }
}

/// Scores a program over every fitness case as the negated sum of absolute errors.
///
/// `0.0` is a perfect fit. The result is always finite: the running total
/// saturates at `f64::MAX` so fitness values stay totally ordered.
pub fn evaluate(program: &Program, dataset: &Dataset) -> f64 {
    let total = dataset
        .cases()
        .iter()
        .fold(0.0_f64, |acc, case| (acc + case_error(program, case)).min(f64::MAX));
    -total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::op::Operator::*;

    fn doubling_dataset() -> Dataset {
        Dataset::new(
            vec![
                FitnessCase {
                    inputs: vec![1.0],
                    target: 2.0,
                },
                FitnessCase {
                    inputs: vec![2.0],
                    target: 4.0,
                },
            ],
            1,
            -1.0,
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_interpret_expression() {
        // (X1 + 5) * X2
        let node = Node::binary(
            Multiply,
            Node::binary(Add, Node::variable(0), Node::constant(5.0)),
            Node::variable(1),
        );
        assert_eq!(interpret(&node, &[1.0, 3.0]), 18.0);
    }

    #[test]
    fn test_missing_variable_is_nan() {
        assert!(interpret(&Node::variable(4), &[1.0]).is_nan());
    }

    #[test]
    fn test_perfect_fit_scores_zero() {
        let program = Program::new(Node::binary(Add, Node::variable(0), Node::variable(0)));
        assert_eq!(evaluate(&program, &doubling_dataset()), 0.0);
    }

    #[test]
    fn test_negated_absolute_error() {
        // X1 predicts 1 and 2 against targets 2 and 4
        let program = Program::new(Node::variable(0));
        assert_eq!(evaluate(&program, &doubling_dataset()), -3.0);

        // Constant 5 misses by 3 and 1
        let program = Program::new(Node::constant(5.0));
        assert_eq!(evaluate(&program, &doubling_dataset()), -4.0);
    }

    #[test]
    fn test_protected_division_keeps_fitness_finite() {
        let dataset = Dataset::new(
            vec![
                FitnessCase {
                    inputs: vec![0.0],
                    target: 1.0,
                },
                FitnessCase {
                    inputs: vec![1e-6],
                    target: 1.0,
                },
            ],
            1,
            0.0,
            1.0,
        )
        .unwrap();
        // X1 / X1 with X1 near zero falls back to 1.0 both times
        let program = Program::new(Node::binary(Divide, Node::variable(0), Node::variable(0)));
        assert_eq!(evaluate(&program, &dataset), 0.0);

        let program = Program::new(Node::binary(Divide, Node::constant(3.0), Node::constant(0.0)));
        assert!(evaluate(&program, &dataset).is_finite());
    }

    #[test]
    fn test_overflow_is_charged_not_propagated() {
        let dataset = doubling_dataset();
        // 1e200 * 1e200 overflows to infinity
        let huge = Node::binary(Multiply, Node::constant(1e200), Node::constant(1e200));
        let program = Program::new(huge.clone());
        assert_eq!(evaluate(&program, &dataset), -NON_FINITE_ERROR);

        // inf - inf yields NaN, still charged
        let program = Program::new(Node::binary(Subtract, huge.clone(), huge));
        assert_eq!(evaluate(&program, &dataset), -NON_FINITE_ERROR);
    }

    #[test]
    fn test_overflow_never_outranks_finite_program() {
        let dataset = doubling_dataset();
        let overflowing = Program::new(Node::binary(
            Multiply,
            Node::constant(1e200),
            Node::constant(1e200),
        ));
        let overflow_fitness = evaluate(&overflowing, &dataset);

        for constant in [0.0, 1e15, 1e100, 1e300, f64::MAX / 4.0] {
            let finite = Program::new(Node::constant(constant));
            let fitness = evaluate(&finite, &dataset);
            assert!(
                overflow_fitness <= fitness,
                "overflow {} ranked above constant {} with {}",
                overflow_fitness,
                constant,
                fitness
            );
        }
    }

    #[test]
    fn test_total_saturates() {
        let dataset = doubling_dataset();
        // Each case error is finite but their sum overflows
        let program = Program::new(Node::constant(f64::MAX));
        let fitness = evaluate(&program, &dataset);
        assert!(fitness.is_finite());
        assert_eq!(fitness, -f64::MAX);
    }
}
