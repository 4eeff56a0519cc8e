use super::Template;
use crate::pour::{Move, Params, PourError, PourState};
use rand::seq::SliceRandom;
use rand::Rng;

/// The sorted arrangement carrying the template's gimmicks.
pub fn goal_for(params: Params, template: Option<&Template>) -> Result<PourState, PourError> {
    let mut state = PourState::goal(params);

    if let Some(template) = template {
        template.apply_gimmicks(&mut state)?;
    }

    Ok(state)
}

/// Moves that keep every structural and gimmick rule but ignore colour matching.
pub fn relaxed_moves(state: &PourState) -> Vec<Move> {
    let count = state.bottles().len();

    (0..count)
        .flat_map(|from| (0..count).map(move |to| (from, to)))
        .filter_map(|(from, to)| {
            state
                .can_pour_relaxed(from, to)
                .ok()
                .map(|amount| Move::new(from, to, amount))
        })
        .collect()
}

/// Applies up to `steps` random relaxed moves, never undoing the previous one.
/// Each move pours a random part of the movable chunk so bottles split and mix.
/// Returns the moves played, with the amounts actually poured.
pub fn scramble<R: Rng>(state: &mut PourState, steps: usize, rng: &mut R) -> Vec<Move> {
    let mut trace: Vec<Move> = Vec::with_capacity(steps);

    for _ in 0..steps {
        let candidates: Vec<Move> = relaxed_moves(state)
            .into_iter()
            .filter(|candidate| match trace.last() {
                Some(last) => !candidate.is_reverse_of(last),
                None => true,
            })
            .collect();

        let pour_move = match candidates.choose(rng) {
            Some(&candidate) => Move {
                amount: rng.gen_range(1, candidate.amount + 1),
                ..candidate
            },
            None => break,
        };

        state.transfer(pour_move);
        trace.push(pour_move);
    }

    trace
}
