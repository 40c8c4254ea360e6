use crate::program::generator::ProgramGenerator;
use crate::program::Program;
use log::debug;
use rand::Rng;

/// Subtree crossover.
///
/// Picks a random node in `parent_a` and a random node in `parent_b`; the offspring is
/// a copy of `parent_a` whose picked subtree is replaced by a copy of `parent_b`'s.
/// Pairs that would push the offspring past `max_size` are redrawn up to `attempts`
/// times, after which an unmodified copy of `parent_a` is returned.
pub fn crossover<R: Rng + ?Sized>(
    parent_a: &Program,
    parent_b: &Program,
    max_size: usize,
    attempts: usize,
    rng: &mut R,
) -> Program {
    let (len_a, len_b) = (parent_a.size(), parent_b.size());

    for _ in 0..attempts {
        let cut_a = rng.random_range(0..len_a);
        let cut_b = rng.random_range(0..len_b);
        let removed = parent_a.subtree(cut_a);
        let donor = parent_b.subtree(cut_b);
        let (Some(removed), Some(donor)) = (removed, donor) else {
            continue;
        };

        if len_a - removed.size() + donor.size() > max_size {
            continue;
        }

        let mut offspring = parent_a.clone();
        offspring.replace_subtree(cut_a, donor.clone());
        return offspring;
    }

    debug!(
        "crossover found no pair within {} nodes after {} attempts, keeping first parent",
        max_size, attempts
    );
    parent_a.clone()
}

/// Subtree mutation.
///
/// Walks a copy of `parent` in preorder; each node is independently replaced, with
/// probability `node_prob`, by a fresh random subtree sized so the whole tree stays
/// within `max_size`. Freshly inserted material is skipped over, not mutated again.
pub fn mutate<R: Rng + ?Sized>(
    parent: &Program,
    node_prob: f64,
    generator: &ProgramGenerator,
    max_size: usize,
    rng: &mut R,
) -> Program {
    let mut offspring = parent.clone();
    let mut size = offspring.size();
    let mut index = 0;

    while index < size {
        if rng.random::<f64>() >= node_prob {
            index += 1;
            continue;
        }

        let replaced = offspring.subtree(index).map_or(1, |node| node.size());
        let budget = max_size.saturating_sub(size - replaced).max(1);
        let fresh = generator.subtree(budget, rng);
        let inserted = fresh.size();
        offspring.replace_subtree(index, fresh);
        size = size - replaced + inserted;
        index += inserted;
    }

    offspring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::generator::ConstantSource;
    use crate::program::op::Operator::*;
    use crate::program::Node;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn generator() -> ProgramGenerator {
        ProgramGenerator::new(2, ConstantSource::Range { min: -1.0, max: 1.0 }, 0.5, 0.5, 1)
    }

    fn parent_a() -> Program {
        Program::new(Node::binary(
            Add,
            Node::binary(Multiply, Node::variable(0), Node::constant(1.0)),
            Node::variable(1),
        ))
    }

    fn parent_b() -> Program {
        Program::new(Node::binary(
            Subtract,
            Node::constant(7.0),
            Node::binary(Divide, Node::variable(1), Node::constant(3.0)),
        ))
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let (a, b) = (parent_a(), parent_b());
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..50 {
            let _ = crossover(&a, &b, 20, 8, &mut rng);
        }
        assert_eq!(a, parent_a());
        assert_eq!(b, parent_b());
    }

    #[test]
    fn test_crossover_respects_size_limit() {
        let gen = generator();
        let mut rng = Pcg64::seed_from_u64(2);
        for _ in 0..200 {
            let a = gen.generate(15, &mut rng);
            let b = gen.generate(15, &mut rng);
            let child = crossover(&a, &b, 15, 8, &mut rng);
            assert!(child.size() <= 15);
        }
    }

    #[test]
    fn test_crossover_with_terminal_parents_copies_donor() {
        let a = Program::new(Node::variable(0));
        let b = Program::new(Node::constant(4.0));
        let mut rng = Pcg64::seed_from_u64(3);
        assert_eq!(crossover(&a, &b, 10, 8, &mut rng), b);
    }

    #[test]
    fn test_crossover_falls_back_to_first_parent() {
        // Under a one-node limit only leaf donors fit
        let a = Program::new(Node::variable(0));
        let b = parent_b();
        let mut rng = Pcg64::seed_from_u64(4);
        let child = crossover(&a, &b, 1, 64, &mut rng);
        assert_eq!(child.size(), 1);

        // With zero attempts the first parent comes back as is
        let child = crossover(&parent_a(), &b, 100, 0, &mut rng);
        assert_eq!(child, parent_a());
    }

    #[test]
    fn test_crossover_material_comes_from_parents() {
        let a = Program::new(Node::binary(Add, Node::variable(0), Node::variable(0)));
        let b = Program::new(Node::binary(Multiply, Node::constant(2.0), Node::constant(2.0)));
        let mut rng = Pcg64::seed_from_u64(5);
        fn only_known(node: &Node) -> bool {
            match node {
                Node::Function(op, children) => {
                    matches!(op, Add | Multiply) && children.iter().all(only_known)
                }
                leaf => *leaf == Node::variable(0) || *leaf == Node::constant(2.0),
            }
        }
        for _ in 0..50 {
            let child = crossover(&a, &b, 10, 8, &mut rng);
            assert!(only_known(child.root()));
        }
    }

    #[test]
    fn test_mutation_with_zero_probability_is_identity() {
        let gen = generator();
        let mut rng = Pcg64::seed_from_u64(6);
        let parent = parent_a();
        for _ in 0..20 {
            assert_eq!(mutate(&parent, 0.0, &gen, 20, &mut rng), parent);
        }
    }

    #[test]
    fn test_mutation_with_certain_probability_replaces_root() {
        let gen = generator();
        let mut rng = Pcg64::seed_from_u64(7);
        let parent = parent_a();
        let child = mutate(&parent, 1.0, &gen, 20, &mut rng);
        // The root is hit first, so the whole tree is fresh material
        assert!(child.size() <= 20);
        assert_eq!(parent, parent_a());
    }

    #[test]
    fn test_mutation_respects_size_limit() {
        let gen = generator();
        let mut rng = Pcg64::seed_from_u64(8);
        for max_size in [1, 3, 7, 15, 30] {
            for _ in 0..100 {
                let parent = gen.generate(max_size, &mut rng);
                let child = mutate(&parent, 0.3, &gen, max_size, &mut rng);
                assert!(child.size() <= max_size, "{} > {}", child.size(), max_size);
            }
        }
    }
}
