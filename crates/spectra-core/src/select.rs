//! Best-candidate selection.

use std::path::PathBuf;

use serde::Serialize;

use crate::score::QualityScore;

/// A candidate that scored successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Candidate file.
    pub path: PathBuf,
    /// Its quality.
    pub score: QualityScore,
}

/// Outcome of selection for one identifier and suffix.
pub type SelectionResult = Option<ScoredCandidate>;

/// Pick the candidate with the highest combined score.
///
/// Candidates must be supplied in discovery order: on equal scores the
/// earlier one is kept. An empty input selects nothing.
pub fn select_best<I>(candidates: I) -> SelectionResult
where
    I: IntoIterator<Item = ScoredCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.score.combined <= current.score.combined => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(name: &str, median: f64, peak: f64) -> ScoredCandidate {
        ScoredCandidate {
            path: PathBuf::from(name),
            score: QualityScore::new(median, peak).unwrap(),
        }
    }

    #[test]
    fn test_highest_combined_wins() {
        // sqrt(50) beats sqrt(40) even though the second has the higher peak
        let best = select_best(vec![candidate("a", 5.0, 10.0), candidate("b", 2.0, 20.0)]);
        assert_eq!(best.unwrap().path, PathBuf::from("a"));

        let best = select_best(vec![candidate("b", 2.0, 20.0), candidate("a", 5.0, 10.0)]);
        assert_eq!(best.unwrap().path, PathBuf::from("a"));
    }

    #[test]
    fn test_tie_keeps_first() {
        let best = select_best(vec![
            candidate("first", 4.0, 9.0),
            candidate("second", 9.0, 4.0),
            candidate("third", 6.0, 6.0),
        ]);
        assert_eq!(best.unwrap().path, PathBuf::from("first"));
    }

    #[test]
    fn test_empty_selects_nothing() {
        assert!(select_best(Vec::new()).is_none());
    }

    proptest! {
        #[test]
        fn winner_is_first_maximum(scores in prop::collection::vec((0u8..5, 1u8..5), 1..12)) {
            let candidates: Vec<ScoredCandidate> = scores
                .iter()
                .enumerate()
                .map(|(idx, (m, p))| candidate(&idx.to_string(), f64::from(*m), f64::from(*p)))
                .collect();
            let best = select_best(candidates.clone()).unwrap();
            let max = candidates
                .iter()
                .map(|c| c.score.combined)
                .fold(f64::NEG_INFINITY, f64::max);
            let first_max = candidates
                .iter()
                .find(|c| c.score.combined == max)
                .unwrap();
            prop_assert_eq!(&best.path, &first_max.path);
            // repeated selection over the same input is stable
            prop_assert_eq!(select_best(candidates).unwrap().path, best.path);
        }
    }
}
