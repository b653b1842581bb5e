//! Majority voting across repeat winners
//!
//! Each repeat of the cross-validation run elects one model; this module
//! combines their binarized predictions on the held-out test set into a
//! single one-hot ballot per row.

use crate::error::{Error, Result};
use ndarray::Array2;

/// Combine indicator ballots by per-class vote count.
///
/// Every ballot is a rows x classes indicator matrix. Votes are summed
/// per cell; each output row is one-hot on the class with the most votes,
/// with ties (including rows nobody voted on) falling to the lowest class
/// index.
pub fn majority_vote(ballots: &[Array2<f32>]) -> Result<Array2<f32>> {
    let first = ballots
        .first()
        .ok_or_else(|| Error::CrossValidation("no ballots to vote on".to_string()))?;

    let shape = first.dim();
    for (i, ballot) in ballots.iter().enumerate() {
        if ballot.dim() != shape {
            return Err(Error::ShapeMismatch(format!(
                "ballot {} is {:?}, expected {:?}",
                i,
                ballot.dim(),
                shape
            )));
        }
    }

    let mut tally = Array2::<f32>::zeros(shape);
    for ballot in ballots {
        tally += ballot;
    }

    let mut winners = Array2::<f32>::zeros(shape);
    for (row, votes) in tally.rows().into_iter().enumerate() {
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        winners[[row, best]] = 1.0;
    }
    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_unanimous_vote() {
        let ballot = array![[1.0_f32, 0.0], [0.0, 1.0]];
        let winners = majority_vote(&[ballot.clone(), ballot.clone(), ballot.clone()]).unwrap();
        assert_eq!(winners, ballot);
    }

    #[test]
    fn test_majority_overrules_minority() {
        let a = array![[1.0_f32, 0.0]];
        let b = array![[1.0_f32, 0.0]];
        let c = array![[0.0_f32, 1.0]];
        let winners = majority_vote(&[a, b, c]).unwrap();
        assert_eq!(winners, array![[1.0, 0.0]]);
    }

    #[test]
    fn test_tie_falls_to_lowest_class() {
        let a = array![[0.0_f32, 0.0, 1.0]];
        let b = array![[1.0_f32, 0.0, 0.0]];
        let winners = majority_vote(&[a, b]).unwrap();
        assert_eq!(winners, array![[1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_unvoted_row_defaults_to_class_zero() {
        let a = array![[0.0_f32, 0.0], [0.0, 1.0]];
        let b = array![[0.0_f32, 0.0], [0.0, 1.0]];
        let winners = majority_vote(&[a, b]).unwrap();
        assert_eq!(winners, array![[1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_multi_hot_ballot_counts_every_column() {
        // One voter lights two classes; the second voter breaks the tie.
        let a = array![[1.0_f32, 1.0, 0.0]];
        let b = array![[0.0_f32, 1.0, 0.0]];
        let winners = majority_vote(&[a, b]).unwrap();
        assert_eq!(winners, array![[0.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_single_ballot_passes_through() {
        let ballot = array![[0.0_f32, 1.0], [1.0, 0.0]];
        let winners = majority_vote(&[ballot.clone()]).unwrap();
        assert_eq!(winners, ballot);
    }

    #[test]
    fn test_empty_ballots_rejected() {
        let err = majority_vote(&[]).unwrap_err();
        assert!(matches!(err, Error::CrossValidation(_)));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = Array2::<f32>::zeros((2, 3));
        let b = Array2::<f32>::zeros((2, 2));
        let err = majority_vote(&[a, b]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}
