use super::{
    abort_controller::AbortController, heuristic::heuristic, move_ordering::order_moves,
    solving_session::SolvingSession, Profiler,
};
use crate::pour::PourState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A sorted state was reached at this depth.
    Solved(u32),
    /// Smallest `f` that went over the bound.
    Exceeded(u32),
    /// Nothing below this node either solves or exceeds the bound.
    DeadEnd,
}

// One bounded depth-first pass of the iterative deepening search
pub struct SolvingIteration<'a, C: AbortController, P: Profiler> {
    bound: u32,
    session: &'a mut SolvingSession<C, P>,
}

impl<'a, C: AbortController, P: Profiler> SolvingIteration<'a, C, P> {
    pub fn new(bound: u32, session: &'a mut SolvingSession<C, P>) -> Self {
        session.visited.clear();
        session.path.clear();
        session.profiler.start_iteration(bound);

        SolvingIteration { bound, session }
    }

    /// `None` when the abort controller stopped the pass.
    pub fn solve(&mut self) -> Option<Step> {
        let start = self.session.start.clone();

        self.search(&start, 0)
    }

    fn search(&mut self, node: &PourState, depth: u32) -> Option<Step> {
        if self.session.abort_controller.should_abort() {
            return None;
        }

        self.session.profiler.visit_node(depth);

        let estimate = depth + heuristic(node);
        if estimate > self.bound {
            return Some(Step::Exceeded(estimate));
        }

        if node.is_solved() {
            self.session.solution = Some(self.session.path.clone());
            return Some(Step::Solved(depth));
        }

        let key = node.stable_hash();
        if let Some(&seen) = self.session.visited.get(&key) {
            if seen <= depth {
                return Some(Step::DeadEnd);
            }
        }
        self.session.visited.insert(key, depth);

        let mut next_bound: Option<u32> = None;

        for pour_move in order_moves(node) {
            let child = node.play(pour_move);

            self.session.path.push(pour_move);
            let step = self.search(&child, depth + 1)?;
            self.session.path.pop();

            match step {
                Step::Solved(found) => return Some(Step::Solved(found)),
                Step::Exceeded(estimate) => {
                    next_bound = Some(next_bound.map_or(estimate, |bound| bound.min(estimate)))
                }
                Step::DeadEnd => {}
            }
        }

        Some(next_bound.map_or(Step::DeadEnd, Step::Exceeded))
    }
}
