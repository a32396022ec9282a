//! Pure scoring rules for answer votes and round totals.
//!
//! Scoring is pure-majority: a settled answer is worth 10 points when the
//! validity vote favours it (ties included), 0 when the majority rejected
//! it, and 5 when a majority of participants marked it as a duplicate,
//! regardless of the validity tally. There is no uniqueness bonus.

/// Points for an answer the majority accepted.
pub const VALID_POINTS: i32 = 10;

/// Points for an answer a majority marked as duplicate.
pub const DUPLICATE_POINTS: i32 = 5;

/// Points for an answer the majority rejected.
pub const INVALID_POINTS: i32 = 0;

/// Bonus for a player whose every category answer settled valid.
pub const COMPLETION_BONUS: i32 = 5;

/// Outcome of the validity vote on a single answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub is_valid: bool,
    pub points: i32,
}

/// Resolve a validity tally by simple majority.
///
/// A tie settles in favour of the answerer (valid, 10 points). With no
/// validity votes at all the answer is worth nothing yet.
pub fn resolve_majority(votes_for: i32, votes_against: i32) -> Verdict {
    if votes_for + votes_against == 0 || votes_against > votes_for {
        Verdict {
            is_valid: false,
            points: INVALID_POINTS,
        }
    } else {
        Verdict {
            is_valid: true,
            points: VALID_POINTS,
        }
    }
}

/// True when duplicate markers outnumber half of the round's participants.
pub fn duplicate_majority(marker_count: usize, participant_count: usize) -> bool {
    marker_count * 2 > participant_count
}

/// Apply the duplicate override on top of a validity verdict.
///
/// A majority-confirmed duplicate is capped at 5 points no matter how the
/// validity vote went; below the majority threshold the verdict stands.
pub fn apply_duplicate_override(
    verdict: Verdict,
    marker_count: usize,
    participant_count: usize,
) -> Verdict {
    if duplicate_majority(marker_count, participant_count) {
        Verdict {
            is_valid: true,
            points: DUPLICATE_POINTS,
        }
    } else {
        verdict
    }
}

/// Completion bonus for a round: granted only when the player produced a
/// valid answer for every category.
pub fn completion_bonus(valid_answers: usize, category_count: usize) -> i32 {
    if category_count > 0 && valid_answers == category_count {
        COMPLETION_BONUS
    } else {
        0
    }
}

/// Assign 1-based standings positions for round totals sorted descending.
/// Equal totals share a position.
pub fn assign_positions(sorted_totals: &[i32]) -> Vec<i32> {
    let mut positions = Vec::with_capacity(sorted_totals.len());
    for (i, total) in sorted_totals.iter().enumerate() {
        if i > 0 && *total == sorted_totals[i - 1] {
            let prev = positions[i - 1];
            positions.push(prev);
        } else {
            positions.push(i as i32 + 1);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_for_settles_valid() {
        let verdict = resolve_majority(3, 1);
        assert!(verdict.is_valid);
        assert_eq!(verdict.points, 10);
    }

    #[test]
    fn test_majority_against_settles_invalid() {
        let verdict = resolve_majority(1, 3);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.points, 0);
    }

    #[test]
    fn test_tie_favours_the_answerer() {
        // 1 vote for, 1 against: the answer stays valid and earns full points
        let verdict = resolve_majority(1, 1);
        assert!(verdict.is_valid);
        assert_eq!(verdict.points, 10);
    }

    #[test]
    fn test_no_votes_is_worth_nothing() {
        let verdict = resolve_majority(0, 0);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.points, 0);
    }

    #[test]
    fn test_duplicate_majority_threshold() {
        // Strictly more than half: 2 of 3 yes, 2 of 4 no
        assert!(duplicate_majority(2, 3));
        assert!(!duplicate_majority(2, 4));
        assert!(duplicate_majority(3, 4));
        assert!(!duplicate_majority(0, 3));
    }

    #[test]
    fn test_duplicate_override_beats_valid_majority() {
        // 2 valid / 1 invalid would settle at 10, but all 3 players marked
        // the answer as a duplicate
        let verdict = resolve_majority(2, 1);
        assert_eq!(verdict.points, 10);

        let overridden = apply_duplicate_override(verdict, 3, 3);
        assert!(overridden.is_valid);
        assert_eq!(overridden.points, 5);
    }

    #[test]
    fn test_duplicate_below_majority_leaves_verdict() {
        let verdict = resolve_majority(2, 1);
        let untouched = apply_duplicate_override(verdict, 1, 3);
        assert_eq!(untouched, verdict);
    }

    #[test]
    fn test_completion_bonus_requires_every_category() {
        assert_eq!(completion_bonus(8, 8), 5);
        assert_eq!(completion_bonus(7, 8), 0);
        assert_eq!(completion_bonus(0, 0), 0);
    }

    #[test]
    fn test_assign_positions_with_ties() {
        assert_eq!(assign_positions(&[30, 25, 25, 10]), vec![1, 2, 2, 4]);
        assert_eq!(assign_positions(&[15]), vec![1]);
        assert_eq!(assign_positions(&[]), Vec::<i32>::new());
    }
}
