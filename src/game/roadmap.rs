//! Roadmap unlock computation
//!
//! A derived view over the progress record, recomputed whenever the
//! record changes. The chain is strictly linear.

/// Node 0 is always open; node i>0 opens once node i-1 is completed.
pub fn unlocked_nodes(progress: &[bool]) -> Vec<bool> {
    (0..progress.len())
        .map(|i| i == 0 || progress[i - 1])
        .collect()
}

/// How many flags have been captured so far.
pub fn flags_captured(progress: &[bool]) -> usize {
    progress.iter().filter(|&&done| done).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_node_is_always_unlocked() {
        assert_eq!(unlocked_nodes(&[false; 5])[0], true);
        assert_eq!(unlocked_nodes(&[true; 5])[0], true);
    }

    #[test]
    fn each_node_requires_the_previous_completion() {
        let progress = [true, false, true, false, false];
        let unlocked = unlocked_nodes(&progress);
        for k in 1..progress.len() {
            assert_eq!(unlocked[k], progress[k - 1], "node {k}");
        }
    }

    #[test]
    fn fully_completed_record_unlocks_everything() {
        assert_eq!(unlocked_nodes(&[true; 5]), vec![true; 5]);
    }

    #[test]
    fn empty_record_yields_empty_view() {
        assert!(unlocked_nodes(&[]).is_empty());
        assert_eq!(flags_captured(&[]), 0);
    }

    #[test]
    fn flags_captured_counts_completions() {
        assert_eq!(flags_captured(&[true, false, true, false, false]), 2);
    }
}
