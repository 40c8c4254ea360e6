use rand::Rng;

/// Index of the fittest entry in `fitness`, ties going to the lowest index.
/// Returns 0 for an empty slice.
pub fn best_index(fitness: &[f64]) -> usize {
    let mut best = 0;
    for (i, &fit) in fitness.iter().enumerate().skip(1) {
        if fit > fitness[best] {
            best = i;
        }
    }
    best
}

/// Tournament selection over cached fitness values.
///
/// Draws `k` indices uniformly with replacement and returns the one with the
/// highest fitness; equal fitness goes to the lower index. `k` is clamped to at
/// least one draw. `fitness` must not be empty.
pub fn tournament<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..fitness.len());
    for _ in 1..k {
        let contestant = rng.random_range(0..fitness.len());
        let (fit, best_fit) = (fitness[contestant], fitness[winner]);
        if fit > best_fit || (fit == best_fit && contestant < winner) {
            winner = contestant;
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_best_index_prefers_first_of_ties() {
        assert_eq!(best_index(&[-3.0, -1.0, -2.0, -1.0]), 1);
        assert_eq!(best_index(&[0.0, 0.0]), 0);
        assert_eq!(best_index(&[-5.0]), 0);
        assert_eq!(best_index(&[]), 0);
    }

    #[test]
    fn test_tournament_returns_valid_index() {
        let fitness: Vec<f64> = (0..10).map(|i| -(i as f64)).collect();
        let mut rng = Pcg64::seed_from_u64(3);
        for k in 1..=10 {
            for _ in 0..100 {
                assert!(tournament(&fitness, k, &mut rng) < fitness.len());
            }
        }
    }

    #[test]
    fn test_tournament_size_one_is_uniform() {
        let fitness = vec![-1.0, -100.0, -50.0, 0.0];
        let mut rng = Pcg64::seed_from_u64(5);
        let mut hits = [0usize; 4];
        for _ in 0..4000 {
            hits[tournament(&fitness, 1, &mut rng)] += 1;
        }
        // Every individual gets picked, even the worst
        for count in hits {
            assert!(count > 700, "hits {:?}", hits);
        }
    }

    #[test]
    fn test_large_tournament_favours_the_best() {
        let fitness: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let mut rng = Pcg64::seed_from_u64(9);
        let best_hits = (0..1000)
            .filter(|_| tournament(&fitness, 60, &mut rng) == 19)
            .count();
        // P(miss index 19 in 60 draws) = 0.95^60 ~ 4.6%
        assert!(best_hits > 900, "best picked {} times", best_hits);
    }

    #[test]
    fn test_tournament_ties_go_to_lowest_index() {
        let fitness = vec![1.0; 8];
        let mut rng = Pcg64::seed_from_u64(1);
        // With every draw tied, the winner is the minimum drawn index, which is
        // 0 almost surely after 200 draws over 8 slots.
        assert_eq!(tournament(&fitness, 200, &mut rng), 0);
    }

    #[test]
    fn test_tournament_is_deterministic_per_seed() {
        let fitness: Vec<f64> = (0..50).map(|i| ((i * 7) % 13) as f64).collect();
        let mut a = Pcg64::seed_from_u64(77);
        let mut b = Pcg64::seed_from_u64(77);
        for _ in 0..100 {
            assert_eq!(tournament(&fitness, 3, &mut a), tournament(&fitness, 3, &mut b));
        }
    }
}
