mod abort_controller;
mod heuristic;
mod move_ordering;
mod profiler;
mod solution;
mod solution_count;
mod solving_iteration;
mod solving_session;

pub use abort_controller::{
    AbortController, CountdownAbortController, NoAbortController, TimeoutAbortController,
};
pub use heuristic::heuristic;
pub use move_ordering::order_moves;
pub use profiler::{NoProfile, Profile, Profiler};
pub use solution::Solution;
pub use solution_count::{count_solutions, SolutionCount, SAMPLE_CAP};
use crate::pour::PourState;
use log::debug;
use solving_iteration::Step;
use solving_session::SolvingSession;
use std::time::Duration;

/// IDA* over pour moves. Hidden flags are cleared before searching.
pub struct Solver {
    start: PourState,
}

impl Solver {
    pub fn new(state: &PourState) -> Solver {
        Solver {
            start: state.revealed(),
        }
    }

    pub fn start(&self) -> &PourState {
        &self.start
    }

    pub fn solve_with_timeout<P: Profiler>(&self, timeout: Duration) -> Solution<P> {
        self.solve(TimeoutAbortController::duration(timeout))
    }

    pub fn solve<P: Profiler, C: AbortController>(&self, abort_controller: C) -> Solution<P> {
        let mut session: SolvingSession<C, P> =
            SolvingSession::new(self.start.clone(), abort_controller);

        if self.start.is_solved() {
            return Solution {
                solved: true,
                timed_out: false,
                min_moves: 0,
                solution_count: SolutionCount::unique(),
                moves: Vec::new(),
                profiler: session.profiler,
            };
        }

        let mut bound = heuristic(&self.start);

        loop {
            let step = session.create_iteration(bound).solve();

            match step {
                None => {
                    debug!("search aborted at bound {}", bound);
                    return Solution::unsolved(bound, true, session.profiler);
                }
                Some(Step::DeadEnd) => {
                    debug!("no solution below bound {}", bound);
                    return Solution::unsolved(bound, false, session.profiler);
                }
                Some(Step::Exceeded(next)) => {
                    debug!("raising bound from {} to {}", bound, next);
                    bound = next;
                }
                Some(Step::Solved(depth)) => {
                    let moves = session.solution.take().unwrap_or_default();
                    let solution_count =
                        count_solutions(&self.start, depth, &session.abort_controller);

                    debug!(
                        "solved in {} moves, {} optimal solutions sampled",
                        depth, solution_count.count
                    );

                    return Solution {
                        solved: true,
                        timed_out: false,
                        min_moves: depth,
                        solution_count,
                        moves,
                        profiler: session.profiler,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::tests::state_from;
    use crate::pour::{Gimmick, Move, PourState};
    use insta::assert_display_snapshot;
    use quickcheck_macros::quickcheck;

    fn solve(state: &PourState) -> Solution<Profile> {
        Solver::new(state).solve(NoAbortController)
    }

    #[test]
    fn one_split_colour() {
        let state = state_from(2, &[&[1, 1], &[2], &[2]]);
        let solution = solve(&state);

        assert!(solution.solved);
        assert!(!solution.timed_out);
        assert_display_snapshot!(solution.min_moves, @"1");
        assert_eq!(solution.moves, vec![Move::new(1, 2, 1)]);
        assert_eq!(solution.distinct_solutions(), 2);
        assert!(solution.count_exhaustive());
        assert!(solution.replay(&state).unwrap().is_solved());
    }

    #[test]
    fn crossed_pair() {
        let state = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        let solution = solve(&state);

        assert!(solution.solved);
        assert_display_snapshot!(solution.min_moves, @"3");
        assert_eq!(solution.profiler.bounds, vec![1, 4]);
        assert!(solution.count_limited());

        let end = solution.replay(&state).unwrap();
        assert!(end.is_solved());
        assert_eq!(solution.moves.len(), 3);
    }

    #[test]
    fn already_sorted() {
        let solution = solve(&state_from(3, &[&[1, 1, 1], &[]]));

        assert!(solution.solved);
        assert_eq!(solution.min_moves, 0);
        assert!(solution.solution_count.is_unique());
    }

    #[test]
    fn vine_can_make_a_deal_unsolvable() {
        let mut state = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        state.set_gimmick(0, Gimmick::Vine).unwrap();
        state.set_gimmick(1, Gimmick::Vine).unwrap();

        let solution = solve(&state);

        assert!(!solution.solved);
        assert!(!solution.timed_out);
    }

    #[test]
    fn hidden_slots_do_not_block_the_solver() {
        let mut state = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        state.set_hidden(0, 0, true).unwrap();
        state.set_hidden(1, 0, true).unwrap();

        assert_eq!(solve(&state).min_moves, 3);
    }

    #[test]
    fn aborted_search_is_not_solved() {
        let state = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        let solution: Solution<NoProfile> =
            Solver::new(&state).solve(CountdownAbortController::new(3));

        assert!(solution.timed_out);
        assert!(!solution.solved);
        assert!(solution.moves.is_empty());
    }

    #[quickcheck]
    fn solved_results_replay_to_sorted(state: PourState) -> bool {
        let solution: Solution<NoProfile> =
            Solver::new(&state).solve(CountdownAbortController::new(20_000));

        if solution.timed_out {
            return !solution.solved;
        }
        if !solution.solved {
            return true;
        }

        let start = state.revealed();
        match solution.replay(&start) {
            Ok(end) => end.is_solved() && solution.moves.len() as u32 == solution.min_moves,
            Err(_) => false,
        }
    }

    #[quickcheck]
    fn hidden_flags_do_not_change_the_result(state: PourState) -> bool {
        let hidden: Solution<NoProfile> =
            Solver::new(&state).solve(CountdownAbortController::new(20_000));
        let revealed: Solution<NoProfile> =
            Solver::new(&state.revealed()).solve(CountdownAbortController::new(20_000));

        hidden.solved == revealed.solved
            && hidden.timed_out == revealed.timed_out
            && hidden.min_moves == revealed.min_moves
    }
}
