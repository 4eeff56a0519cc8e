use crate::pour::{Move, PourState};

/// Legal moves with pours onto a matching non-empty top tried first.
/// Ordering only, nothing is pruned.
pub fn order_moves(state: &PourState) -> Vec<Move> {
    let mut moves: Vec<Move> = state.legal_moves().collect();

    moves.sort_by_key(|pour_move| !onto_matching_top(state, pour_move));

    moves
}

fn onto_matching_top(state: &PourState, pour_move: &Move) -> bool {
    match (state.bottle(pour_move.from), state.bottle(pour_move.to)) {
        (Some(from), Some(to)) => !to.is_empty() && from.top_color() == to.top_color(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::tests::state_from;

    #[test]
    fn matching_pours_come_first() {
        let state = state_from(3, &[&[2, 1], &[], &[1]]);
        let moves = order_moves(&state);

        assert_eq!(moves[0], Move::new(0, 2, 1));
        assert_eq!(moves.len(), state.legal_moves().count());
    }
}
