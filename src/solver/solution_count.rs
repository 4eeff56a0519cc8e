use super::abort_controller::AbortController;
use crate::pour::PourState;
use std::collections::HashMap;

/// Counting stops once this many optimal solutions have been seen.
pub const SAMPLE_CAP: u32 = 4;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionCount {
    pub count: u32,
    /// The traversal finished without hitting the time budget or the cap.
    pub exhaustive: bool,
    pub timed_out: bool,
    pub limit_hit: bool,
}

impl SolutionCount {
    pub fn unique() -> SolutionCount {
        SolutionCount {
            count: 1,
            exhaustive: true,
            timed_out: false,
            limit_hit: false,
        }
    }

    pub fn is_unique(&self) -> bool {
        self.exhaustive && self.count == 1
    }
}

/// Counts move sequences of exactly `depth` moves that sort `start`.
/// A path is dropped when it reaches a state already seen at the same or a
/// smaller depth, so reorderings of independent moves are counted once.
pub fn count_solutions<C: AbortController>(
    start: &PourState,
    depth: u32,
    abort_controller: &C,
) -> SolutionCount {
    let mut counter = Counter {
        target: depth,
        abort_controller,
        best_depth: HashMap::new(),
        found: 0,
        aborted: false,
    };

    counter.count(start, 0);

    let limit_hit = counter.found >= SAMPLE_CAP;

    SolutionCount {
        count: counter.found.min(SAMPLE_CAP),
        exhaustive: !counter.aborted && !limit_hit,
        timed_out: counter.aborted,
        limit_hit,
    }
}

struct Counter<'a, C: AbortController> {
    target: u32,
    abort_controller: &'a C,
    /// Shallowest depth each unsolved state hash was reached at.
    best_depth: HashMap<u64, u32>,
    found: u32,
    aborted: bool,
}

impl<'a, C: AbortController> Counter<'a, C> {
    fn count(&mut self, node: &PourState, depth: u32) -> Option<u32> {
        if self.found >= SAMPLE_CAP {
            return None;
        }

        if self.abort_controller.should_abort() {
            self.aborted = true;
            return None;
        }

        if node.is_solved() {
            if depth == self.target {
                self.found += 1;
                return Some(1);
            }
            return Some(0);
        }

        if depth >= self.target {
            return Some(0);
        }

        let hash = node.stable_hash();
        match self.best_depth.get(&hash) {
            Some(&seen) if seen <= depth => return Some(0),
            _ => {
                self.best_depth.insert(hash, depth);
            }
        }

        let mut total = 0;
        for pour_move in node.legal_moves().collect::<Vec<_>>() {
            total += self.count(&node.play(pour_move), depth + 1)?;
        }

        Some(total)
    }
}
