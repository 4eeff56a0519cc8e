use crate::pour::PourState;
use crate::solver::{Profiler, Solution, Solver};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the start state has no legal move")]
    NoLegalMove,
    #[error("the start state is already sorted")]
    AlreadySolved,
    #[error("the solver ran out of time")]
    TimedOut,
    #[error("the start state has no solution")]
    Unsolvable,
}

pub fn validate_candidate<P: Profiler>(
    candidate: &PourState,
    timeout: Duration,
) -> Result<Solution<P>, Rejection> {
    if candidate.is_solved() {
        return Err(Rejection::AlreadySolved);
    }

    if !candidate.has_any_move() {
        return Err(Rejection::NoLegalMove);
    }

    let solution = Solver::new(candidate).solve_with_timeout::<P>(timeout);

    if solution.timed_out {
        Err(Rejection::TimedOut)
    } else if !solution.solved {
        Err(Rejection::Unsolvable)
    } else {
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::tests::state_from;
    use crate::pour::{Gimmick, Params};
    use crate::solver::NoProfile;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn accepts_solvable_deal() {
        let state = state_from(2, &[&[1, 2], &[2, 1], &[]]);

        let solution = validate_candidate::<NoProfile>(&state, TIMEOUT).unwrap();

        assert_eq!(solution.min_moves, 3);
    }

    #[test]
    fn rejects_stuck_deal() {
        let mut state = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        state.set_gimmick(0, Gimmick::Vine).unwrap();
        state.set_gimmick(1, Gimmick::Vine).unwrap();

        assert_eq!(
            validate_candidate::<NoProfile>(&state, TIMEOUT).err(),
            Some(Rejection::NoLegalMove)
        );
    }

    #[test]
    fn rejects_sorted_deal() {
        let state = PourState::goal(Params::new(2, 3, 2));

        assert_eq!(
            validate_candidate::<NoProfile>(&state, TIMEOUT).err(),
            Some(Rejection::AlreadySolved)
        );
    }

    #[test]
    fn rejects_deal_with_no_solution() {
        let mut state = state_from(2, &[&[1, 2], &[2, 1], &[], &[1]]);
        state.set_gimmick(0, Gimmick::Vine).unwrap();

        assert_eq!(
            validate_candidate::<NoProfile>(&state, Duration::from_secs(5)).err(),
            Some(Rejection::Unsolvable)
        );
    }
}
