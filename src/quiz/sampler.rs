use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::QuizError;
use crate::store::Word;

/// Sampling weight for a word given its answer history.
///
/// `diff = wrong - correct`; words answered correctly at least as often as
/// wrongly sit at the floor of 1.0, so no word is ever excluded from
/// selection. Above that the weight grows logarithmically with `diff`.
pub fn difficulty_weight(wrong_count: i64, correct_count: i64) -> f64 {
    let diff = wrong_count - correct_count;
    if diff <= 0 {
        1.0
    } else {
        1.0 + (1.0 + diff as f64).ln()
    }
}

/// Pick exactly `k` words from `candidates`, with replacement, with
/// probability proportional to each word's difficulty weight.
pub fn sample<'a, R: Rng + ?Sized>(
    candidates: &'a [Word],
    k: usize,
    rng: &mut R,
) -> Result<Vec<&'a Word>, QuizError> {
    if candidates.is_empty() {
        return Err(QuizError::EmptyCandidatePool);
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|w| difficulty_weight(w.wrong_count, w.correct_count))
        .collect();
    // Weights are floored at 1.0, so the only way construction can fail is
    // an empty pool, which was rejected above.
    let dist = WeightedIndex::new(&weights).map_err(|_| QuizError::EmptyCandidatePool)?;

    Ok((0..k).map(|_| &candidates[dist.sample(rng)]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(id: i64, original: &str, translation: &str, correct: i64, wrong: i64) -> Word {
        Word {
            id,
            list_id: 1,
            original: original.to_string(),
            translation: translation.to_string(),
            correct_count: correct,
            wrong_count: wrong,
            last_wrong_at: None,
            is_global: false,
        }
    }

    #[test]
    fn test_weight_floor_is_one() {
        assert_eq!(difficulty_weight(0, 0), 1.0);
        assert_eq!(difficulty_weight(0, 10), 1.0);
        assert_eq!(difficulty_weight(3, 3), 1.0);
    }

    #[test]
    fn test_weight_grows_with_error_surplus() {
        assert_eq!(difficulty_weight(1, 0), 1.0 + 2.0_f64.ln());
        assert_eq!(difficulty_weight(5, 2), 1.0 + 4.0_f64.ln());
    }

    #[test]
    fn test_weight_is_monotonic_in_diff() {
        let mut previous = 0.0;
        for diff in -3..20 {
            let weight = difficulty_weight(diff, 0);
            assert!(
                weight >= previous,
                "weight must not decrease (diff {diff}: {weight} < {previous})"
            );
            previous = weight;
        }
    }

    #[test]
    fn test_sample_returns_exactly_k_items() {
        let pool = vec![word(1, "dog", "hund", 0, 0), word(2, "cat", "katt", 0, 0)];
        let mut rng = StdRng::seed_from_u64(7);

        for k in [0, 1, 2, 5, 50] {
            let picked = sample(&pool, k, &mut rng).unwrap();
            assert_eq!(picked.len(), k);
            for w in picked {
                assert!(pool.iter().any(|p| p.id == w.id));
            }
        }
    }

    #[test]
    fn test_sample_replaces_when_pool_is_small() {
        let pool = vec![word(1, "dog", "hund", 0, 0)];
        let mut rng = StdRng::seed_from_u64(7);

        let picked = sample(&pool, 4, &mut rng).unwrap();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|w| w.id == 1));
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_matches!(sample(&[], 3, &mut rng), Err(QuizError::EmptyCandidatePool));
    }

    #[test]
    fn test_struggling_word_wins_a_strict_majority() {
        // hund: diff 3, weight 1 + ln(4) ≈ 2.39; katt: weight 1.0, so hund
        // should land around 70% of draws
        let pool = vec![word(1, "hund", "dog", 2, 5), word(2, "katt", "cat", 5, 0)];
        let mut rng = StdRng::seed_from_u64(42);

        let mut hund = 0;
        for _ in 0..1000 {
            if sample(&pool, 1, &mut rng).unwrap()[0].id == 1 {
                hund += 1;
            }
        }
        assert!(hund > 600, "expected hund in a strict majority, got {hund}/1000");
    }
}
