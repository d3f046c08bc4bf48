use rayon::prelude::*;
use tracing::debug;

use crate::config::constant::IMPROVEMENT_EPSILON;
use crate::distance::DistanceMatrix;
use crate::domain::types::LocationId;
use crate::evaluation::fitness::route_miles;

/// Reverse segments of `stops` while that shortens hub -> stops -> hub.
///
/// A pass walks the pairs `(i, j)` with `i < j < n - 1` in order, so the
/// last stop keeps its place. Every improving reversal is applied on the
/// spot and the walk resumes at the next pair. Candidates ahead of the
/// cursor are scored in parallel and the first improving one is taken,
/// which matches a sequential walk. Passes repeat until one finds nothing
/// or `move_limit` moves have been made.
pub fn two_opt_bounded(
    stops: &[LocationId],
    hub: LocationId,
    dm: &DistanceMatrix,
    move_limit: usize,
) -> Vec<LocationId> {
    let n = stops.len();
    let mut best = stops.to_vec();
    let mut best_miles = route_miles(&best, hub, dm);

    let pairs: Vec<(usize, usize)> = (0..n.saturating_sub(2))
        .flat_map(|i| ((i + 1)..n - 1).map(move |j| (i, j)))
        .collect();

    let mut moves = 0;
    let mut improved = true;
    while improved && moves < move_limit {
        improved = false;
        let mut cursor = 0;

        while moves < move_limit && cursor < pairs.len() {
            let current = &best;
            let threshold = best_miles;
            let hit = pairs[cursor..]
                .par_iter()
                .enumerate()
                .map(|(offset, &(i, j))| {
                    let mut candidate = current.clone();
                    candidate[i..=j].reverse();
                    (offset, route_miles(&candidate, hub, dm), candidate)
                })
                .find_first(|(_, miles, _)| *miles + IMPROVEMENT_EPSILON < threshold);

            let Some((offset, miles, candidate)) = hit else {
                break;
            };
            best = candidate;
            best_miles = miles;
            moves += 1;
            improved = true;
            cursor += offset + 1;
        }
    }

    debug!("2-opt applied {} moves, {:.1} miles", moves, best_miles);
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> DistanceMatrix {
        let rows: Vec<Vec<f64>> = (0..6)
            .map(|i: i32| (0..6).map(|j: i32| (i - j).abs() as f64).collect())
            .collect();
        DistanceMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn untangles_a_crossing_route() {
        let dm = line();
        let tangled = vec![1, 4, 3, 2, 5];
        assert_eq!(route_miles(&tangled, 0, &dm), 14.0);

        let untangled = two_opt_bounded(&tangled, 0, &dm, 32);

        assert_eq!(untangled, vec![1, 2, 3, 4, 5]);
        assert_eq!(route_miles(&untangled, 0, &dm), 10.0);
    }

    #[test]
    fn never_lengthens_and_respects_the_move_limit() {
        let dm = line();
        let tangled = vec![5, 1, 4, 2, 3];
        let before = route_miles(&tangled, 0, &dm);

        assert_eq!(two_opt_bounded(&tangled, 0, &dm, 0), tangled);
        let after = two_opt_bounded(&tangled, 0, &dm, 1);
        assert!(route_miles(&after, 0, &dm) < before);
        assert_ne!(after, tangled);
    }

    #[test]
    fn last_stop_keeps_its_place() {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 5.0, 1.0, 10.0],
            vec![1.0, 0.0, 1.0, 5.0, 5.0],
            vec![5.0, 1.0, 0.0, 1.0, 1.0],
            vec![1.0, 5.0, 1.0, 0.0, 1.0],
            vec![10.0, 5.0, 1.0, 1.0, 0.0],
        ])
        .unwrap();
        let stops = vec![1, 2, 3, 4];
        assert_eq!(route_miles(&stops, 0, &dm), 14.0);
        // only swapping the final two stops would help
        assert_eq!(route_miles(&[1, 2, 4, 3], 0, &dm), 5.0);

        assert_eq!(two_opt_bounded(&stops, 0, &dm, 32), stops);
    }

    /// Plain nested-loop walk, applying each improvement and moving on.
    fn walk_in_order(stops: &[LocationId], hub: LocationId, dm: &DistanceMatrix, limit: usize) -> Vec<LocationId> {
        let mut route = stops.to_vec();
        let mut best = route_miles(&route, hub, dm);
        let mut moves = 0;
        let mut improved = true;
        while improved && moves < limit {
            improved = false;
            let n = route.len();
            for i in 0..n.saturating_sub(2) {
                for j in (i + 1)..n - 1 {
                    let mut candidate = route.clone();
                    candidate[i..=j].reverse();
                    let miles = route_miles(&candidate, hub, dm);
                    if miles + IMPROVEMENT_EPSILON < best {
                        route = candidate;
                        best = miles;
                        moves += 1;
                        improved = true;
                        if moves >= limit {
                            return route;
                        }
                    }
                }
            }
        }
        route
    }

    #[test]
    fn parallel_scoring_matches_an_in_order_walk() {
        use rand::seq::SliceRandom;
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        for seed in [3u64, 11, 42, 97, 512] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let size = 10;
            let mut rows: Vec<Vec<f64>> = vec![vec![0.0; size]; size];
            for i in 0..size {
                for j in (i + 1)..size {
                    let miles = rng.gen_range(1..=20) as f64;
                    rows[i][j] = miles;
                    rows[j][i] = miles;
                }
            }
            let dm = DistanceMatrix::from_rows(rows).unwrap();
            let mut stops: Vec<LocationId> = (1..size).collect();
            stops.shuffle(&mut rng);

            for limit in [1, 3, 32] {
                assert_eq!(
                    two_opt_bounded(&stops, 0, &dm, limit),
                    walk_in_order(&stops, 0, &dm, limit),
                    "seed {} limit {}",
                    seed,
                    limit
                );
            }
        }
    }
}
