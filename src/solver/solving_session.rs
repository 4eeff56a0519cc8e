use super::{
    abort_controller::AbortController, solving_iteration::SolvingIteration, Profiler,
};
use crate::pour::{Move, PourState};
use std::collections::HashMap;

pub struct SolvingSession<C: AbortController, P: Profiler> {
    pub start: PourState,
    /// Shallowest depth each state hash was expanded at within the current bound.
    pub visited: HashMap<u64, u32>,
    pub path: Vec<Move>,
    pub solution: Option<Vec<Move>>,
    pub profiler: P,
    pub abort_controller: C,
}

impl<C: AbortController, P: Profiler> SolvingSession<C, P> {
    pub fn new(start: PourState, abort_controller: C) -> SolvingSession<C, P> {
        SolvingSession {
            start,
            visited: HashMap::new(),
            path: Vec::new(),
            solution: None,
            profiler: P::new(),
            abort_controller,
        }
    }

    pub fn create_iteration(&mut self, bound: u32) -> SolvingIteration<C, P> {
        SolvingIteration::new(bound, self)
    }
}
