//! Action selection policies over a value table
//!
//! All selectors are free functions: they read the tables, consume
//! randomness from the caller's generator, and keep no state of their own.
//!
//! `epsilon` is an exploit threshold: a uniform draw `r` in `[0, 1)` with
//! `r > epsilon` explores, so exploration happens with probability
//! `1 - epsilon`.

use rand::{Rng, seq::IndexedRandom};

use crate::{
    q_learning::{heuristic::HeuristicTable, q_table::ValueTable},
    types::{ActionId, StateId},
};

/// Epsilon-greedy choice among `available`.
///
/// A single available action is returned without drawing from `rng`.
/// Exploitation restricts the row to `available` and picks uniformly among
/// the actions attaining its maximum. Returns `None` only when `available`
/// is empty.
pub fn choose<R: Rng + ?Sized>(
    q: &ValueTable,
    state: StateId,
    available: &[ActionId],
    epsilon: f64,
    rng: &mut R,
) -> Option<ActionId> {
    if let [only] = available {
        return Some(*only);
    }
    if available.is_empty() {
        return None;
    }

    if rng.random::<f64>() > epsilon {
        available.choose(rng).copied()
    } else {
        Some(q.argmax_among(state, available, rng))
    }
}

/// Greedy action over the full row, first maximum wins.
///
/// No exploration and no legality filter; deployment callers must only use
/// it where every action of the row is legal or the table rules illegal ones
/// out.
pub fn choose_optimal(q: &ValueTable, state: StateId) -> ActionId {
    q.first_argmax(state)
}

/// Heuristic-augmented choice.
///
/// Scores the full row by `Q + iota * H`. Explores uniformly among
/// `available` when the draw exceeds `epsilon` or when every score is
/// non-zero; otherwise returns the first best-scoring action of the full row,
/// which the environment must tolerate even when it is not legal.
pub fn choose_heuristic<R: Rng + ?Sized>(
    q: &ValueTable,
    h: &HeuristicTable,
    state: StateId,
    available: &[ActionId],
    iota: f64,
    epsilon: f64,
    rng: &mut R,
) -> Option<ActionId> {
    if let [only] = available {
        return Some(*only);
    }
    if available.is_empty() {
        return None;
    }

    let scores: Vec<f64> = q
        .row(state)
        .iter()
        .zip(h.row(state))
        .map(|(&value, &bonus)| value + iota * bonus)
        .collect();

    let explore = rng.random::<f64>() > epsilon;
    if explore || scores.iter().all(|&score| score != 0.0) {
        return available.choose(rng).copied();
    }

    let mut best = 0;
    for (index, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = index;
        }
    }
    Some(ActionId::new(best))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn ids(indices: &[usize]) -> Vec<ActionId> {
        indices.iter().copied().map(ActionId::new).collect()
    }

    #[test]
    fn test_single_action_short_circuits() {
        let q = ValueTable::zeros(1, 3);
        let mut rng = StdRng::seed_from_u64(1);
        for epsilon in [0.0, 0.5, 1.0] {
            for _ in 0..20 {
                let action = choose(&q, StateId::new(0), &ids(&[2]), epsilon, &mut rng);
                assert_eq!(action, Some(ActionId::new(2)));
            }
        }
    }

    #[test]
    fn test_single_action_consumes_no_randomness() {
        let q = ValueTable::zeros(1, 2);
        let mut rng = StdRng::seed_from_u64(9);
        let mut reference = StdRng::seed_from_u64(9);
        choose(&q, StateId::new(0), &ids(&[1]), 0.3, &mut rng);
        assert_eq!(rng.random::<u64>(), reference.random::<u64>());
    }

    #[test]
    fn test_empty_available_returns_none() {
        let q = ValueTable::zeros(1, 2);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(choose(&q, StateId::new(0), &[], 1.0, &mut rng), None);
    }

    #[test]
    fn test_epsilon_one_always_exploits() {
        let mut q = ValueTable::zeros(1, 4);
        q.set(StateId::new(0), ActionId::new(3), 5.0);
        q.set(StateId::new(0), ActionId::new(1), 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let action = choose(&q, StateId::new(0), &ids(&[0, 1, 2]), 1.0, &mut rng);
            assert_eq!(action, Some(ActionId::new(1)));
        }
    }

    #[test]
    fn test_epsilon_zero_explores_among_available() {
        let mut q = ValueTable::zeros(1, 4);
        q.set(StateId::new(0), ActionId::new(0), 100.0);
        let available = ids(&[0, 2]);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_two = false;
        for _ in 0..200 {
            let action = choose(&q, StateId::new(0), &available, 0.0, &mut rng).unwrap();
            assert!(available.contains(&action));
            seen_two |= action == ActionId::new(2);
        }
        assert!(seen_two, "exploration should reach non-greedy actions");
    }

    #[test]
    fn test_choose_optimal_ignores_availability() {
        let mut q = ValueTable::zeros(1, 3);
        q.set(StateId::new(0), ActionId::new(2), 0.5);
        assert_eq!(choose_optimal(&q, StateId::new(0)), ActionId::new(2));
    }

    #[test]
    fn test_heuristic_all_zero_scores_take_first_action() {
        let q = ValueTable::zeros(1, 3);
        let h = HeuristicTable::zeros(1, 3);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let action =
                choose_heuristic(&q, &h, StateId::new(0), &ids(&[1, 2]), 0.9, 1.0, &mut rng);
            assert_eq!(action, Some(ActionId::new(0)));
        }
    }

    #[test]
    fn test_heuristic_all_nonzero_scores_explore() {
        let mut q = ValueTable::zeros(1, 2);
        q.set(StateId::new(0), ActionId::new(0), 5.0);
        q.set(StateId::new(0), ActionId::new(1), 1.0);
        let h = HeuristicTable::zeros(1, 2);
        let mut rng = StdRng::seed_from_u64(5);
        let mut picks = [0usize; 2];
        for _ in 0..1000 {
            let action =
                choose_heuristic(&q, &h, StateId::new(0), &ids(&[0, 1]), 0.9, 1.0, &mut rng)
                    .unwrap();
            picks[action.index()] += 1;
        }
        assert!(picks[1] > 300, "non-zero row should be explored: {picks:?}");
    }

    #[test]
    fn test_heuristic_argmax_spans_full_row() {
        let mut q = ValueTable::zeros(1, 3);
        q.set(StateId::new(0), ActionId::new(2), 2.0);
        let h = HeuristicTable::zeros(1, 3);
        let mut rng = StdRng::seed_from_u64(5);
        let action = choose_heuristic(&q, &h, StateId::new(0), &ids(&[0, 1]), 0.9, 1.0, &mut rng);
        assert_eq!(action, Some(ActionId::new(2)));
    }

    #[test]
    fn test_heuristic_bonus_steers_choice() {
        let mut q = ValueTable::zeros(1, 3);
        q.set(StateId::new(0), ActionId::new(0), 1.0);
        q.set(StateId::new(0), ActionId::new(1), 0.5);
        let mut h = HeuristicTable::zeros(1, 3);
        h.update(&q, StateId::new(0), ActionId::new(1), 0.9);

        // scores: a0 = 1.0, a1 = 0.5 + 1.0 * (1.0 - 0.5 + 0.9) = 1.9, a2 = 0
        let mut rng = StdRng::seed_from_u64(5);
        let action = choose_heuristic(&q, &h, StateId::new(0), &ids(&[0, 1]), 1.0, 1.0, &mut rng);
        assert_eq!(action, Some(ActionId::new(1)));
    }
}
