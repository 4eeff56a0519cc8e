use crate::pour::PourState;

/// Structural estimate of the moves left: one per unsorted bottle, more for
/// fragmented ones, minus up to two for spare empty bottles.
///
/// Not admissible under every gimmick layout.
pub fn heuristic(state: &PourState) -> u32 {
    let mut estimate = 0;
    let mut empty = 0;

    for bottle in state.bottles() {
        if bottle.is_empty() {
            empty += 1;
        } else if !bottle.is_mono_full() {
            estimate += bottle.color_groups().saturating_sub(1).max(1);
        }
    }

    estimate.saturating_sub(empty.min(2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::tests::state_from;
    use crate::pour::{Params, PourState};

    #[test]
    fn sorted_state_scores_zero() {
        assert_eq!(heuristic(&PourState::goal(Params::new(4, 6, 4))), 0);
    }

    #[test]
    fn fragmented_bottles_score_their_extra_groups() {
        let state = state_from(4, &[&[1, 2, 1, 2], &[2, 1, 2, 1], &[3, 3, 3, 3]]);

        assert_eq!(heuristic(&state), 6);
    }

    #[test]
    fn empty_bottles_relieve_at_most_two() {
        let state = state_from(2, &[&[1, 2], &[2], &[1], &[], &[], &[]]);

        assert_eq!(heuristic(&state), 1);
    }
}
