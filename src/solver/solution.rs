use super::{Profiler, SolutionCount};
use crate::pour::{Move, PourError, PourState};

pub struct Solution<P: Profiler> {
    pub solved: bool,
    /// The budget ran out. `min_moves` is then only a lower bound.
    pub timed_out: bool,
    pub min_moves: u32,
    pub solution_count: SolutionCount,
    /// First optimal path found, empty unless solved.
    pub moves: Vec<Move>,
    pub profiler: P,
}

impl<P: Profiler> Solution<P> {
    pub(super) fn unsolved(bound: u32, timed_out: bool, profiler: P) -> Solution<P> {
        Solution {
            solved: false,
            timed_out,
            min_moves: bound,
            solution_count: SolutionCount::default(),
            moves: Vec::new(),
            profiler,
        }
    }

    pub fn distinct_solutions(&self) -> u32 {
        self.solution_count.count
    }

    pub fn count_exhaustive(&self) -> bool {
        self.solution_count.exhaustive
    }

    pub fn count_limited(&self) -> bool {
        self.solution_count.limit_hit
    }

    /// Plays the solution moves from `start`.
    pub fn replay(&self, start: &PourState) -> Result<PourState, PourError> {
        let mut state = start.clone();

        for pour_move in self.moves.iter() {
            state.apply(*pour_move)?;
        }

        Ok(state)
    }
}
