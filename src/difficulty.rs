use crate::pour::{Gimmick, PourState};
use crate::solver::{heuristic, Profiler, Solution};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Tunable constants of the difficulty curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyWeights {
    pub expected_moves_per_unit: f64,
    pub move_exponent: f64,
    pub move_scale: f64,
    pub move_cap: f64,
    pub heuristic_exponent: f64,
    pub heuristic_scale: f64,
    pub heuristic_cap: f64,
    pub fragment_weight: f64,
    pub fragment_cap: f64,
    pub hidden_first: f64,
    pub hidden_repeat_same: f64,
    pub hidden_repeat_mixed: f64,
    pub hidden_scale: f64,
    pub hidden_spread_bonus: f64,
    pub hidden_cap: f64,
    pub cloth: f64,
    pub vine: f64,
    pub bush: f64,
    pub gimmick_saturation: f64,
    pub gimmick_softness: f64,
    pub gimmick_flat: f64,
    pub gimmick_flat_limit: usize,
    pub gimmick_empty_relief: f64,
    pub gimmick_cap: f64,
    pub overlap: f64,
    pub color_threshold: usize,
    pub color_step: f64,
    pub color_cap: f64,
    /// Relief for one, two, and three or more empty bottles.
    pub empty_relief: [f64; 3],
    pub solved_credit: f64,
    pub unique_bonus: f64,
    pub pair_bonus: f64,
    pub many_penalty: f64,
    /// Upper bound forced on the score when three or more bottles start empty.
    pub crowded_cap: f64,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        DifficultyWeights {
            expected_moves_per_unit: 1.1,
            move_exponent: 1.35,
            move_scale: 30.0,
            move_cap: 40.0,
            heuristic_exponent: 1.2,
            heuristic_scale: 1.5,
            heuristic_cap: 15.0,
            fragment_weight: 0.6,
            fragment_cap: 12.0,
            hidden_first: 1.0,
            hidden_repeat_same: 0.35,
            hidden_repeat_mixed: 0.6,
            hidden_scale: 2.0,
            hidden_spread_bonus: 6.0,
            hidden_cap: 20.0,
            cloth: 0.8,
            vine: 1.0,
            bush: 1.3,
            gimmick_saturation: 18.0,
            gimmick_softness: 2.5,
            gimmick_flat: 2.0,
            gimmick_flat_limit: 3,
            gimmick_empty_relief: 0.75,
            gimmick_cap: 25.0,
            overlap: 0.35,
            color_threshold: 5,
            color_step: 1.5,
            color_cap: 8.0,
            empty_relief: [2.0, 5.0, 9.0],
            solved_credit: 1.5,
            unique_bonus: 6.0,
            pair_bonus: 3.0,
            many_penalty: 3.0,
            crowded_cap: 24.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DifficultyLabel {
    VeryEasy,
    Easy,
    Normal,
    Hard,
    VeryHard,
}

impl DifficultyLabel {
    pub fn from_score(score: f64) -> DifficultyLabel {
        if score < 10.0 {
            DifficultyLabel::VeryEasy
        } else if score < 25.0 {
            DifficultyLabel::Easy
        } else if score < 60.0 {
            DifficultyLabel::Normal
        } else if score < 72.0 {
            DifficultyLabel::Hard
        } else {
            DifficultyLabel::VeryHard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLabel::VeryEasy => "Very Easy",
            DifficultyLabel::Easy => "Easy",
            DifficultyLabel::Normal => "Normal",
            DifficultyLabel::Hard => "Hard",
            DifficultyLabel::VeryHard => "Very Hard",
        }
    }
}

impl Display for DifficultyLabel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty label `{0}`")]
pub struct UnknownLabel(pub String);

impl FromStr for DifficultyLabel {
    type Err = UnknownLabel;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        [
            DifficultyLabel::VeryEasy,
            DifficultyLabel::Easy,
            DifficultyLabel::Normal,
            DifficultyLabel::Hard,
            DifficultyLabel::VeryHard,
        ]
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == label.trim())
        .ok_or_else(|| UnknownLabel(label.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DifficultyBreakdown {
    pub move_pressure: f64,
    pub heuristic: f64,
    pub fragmentation: f64,
    pub hidden: f64,
    pub gimmick: f64,
    pub overlap: f64,
    pub color: f64,
    pub empty_relief: f64,
    pub solved_credit: f64,
    pub solution: f64,
    pub total: f64,
}

impl Display for DifficultyBreakdown {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(
            f,
            "Move: {:.1}  Heuristic: {:.1}  Fragment: {:.1}",
            self.move_pressure, self.heuristic, self.fragmentation
        )?;
        writeln!(
            f,
            "Hidden: {:.1}  Gimmick: {:.1}  Overlap: {:.1}  Color: {:.1}",
            self.hidden, self.gimmick, self.overlap, self.color
        )?;
        writeln!(
            f,
            "Empty: {:.1}  Sorted: {:.1}  Solution: {:.1}  Total: {:.1}",
            self.empty_relief, self.solved_credit, self.solution, self.total
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Difficulty {
    pub score: f64,
    pub label: DifficultyLabel,
    pub breakdown: DifficultyBreakdown,
}

/// Scores a start state that `solution` has already solved.
pub fn assess<P: Profiler>(
    state: &PourState,
    solution: &Solution<P>,
    weights: &DifficultyWeights,
) -> Difficulty {
    let params = state.params();
    let empty = state.empty_bottle_count();

    let mut breakdown = DifficultyBreakdown {
        move_pressure: move_pressure(state, solution.min_moves, weights),
        heuristic: (weights.heuristic_scale
            * f64::from(heuristic(state)).powf(weights.heuristic_exponent))
        .min(weights.heuristic_cap),
        fragmentation: fragmentation(state, weights),
        hidden: hidden_pressure(state, weights),
        gimmick: gimmick_pressure(state, weights),
        color: (params.num_colors.saturating_sub(weights.color_threshold) as f64
            * weights.color_step)
            .min(weights.color_cap),
        empty_relief: match empty {
            0 => 0.0,
            1 => -weights.empty_relief[0],
            2 => -weights.empty_relief[1],
            _ => -weights.empty_relief[2],
        },
        solved_credit: -weights.solved_credit * state.mono_full_count() as f64,
        ..DifficultyBreakdown::default()
    };

    breakdown.overlap = -weights.overlap * breakdown.hidden.min(breakdown.gimmick);

    let count = solution.solution_count;
    breakdown.solution = if count.is_unique() {
        weights.unique_bonus
    } else if count.exhaustive && count.count == 2 {
        weights.pair_bonus
    } else if count.count >= 3 || count.limit_hit {
        -weights.many_penalty
    } else {
        0.0
    };

    let sum = breakdown.move_pressure
        + breakdown.heuristic
        + breakdown.fragmentation
        + breakdown.hidden
        + breakdown.gimmick
        + breakdown.overlap
        + breakdown.color
        + breakdown.empty_relief
        + breakdown.solved_credit
        + breakdown.solution;

    let mut score = sum.max(0.0).min(100.0);
    if empty >= 3 {
        score = score.min(weights.crowded_cap);
    }
    breakdown.total = score;

    Difficulty {
        score,
        label: DifficultyLabel::from_score(score),
        breakdown,
    }
}

fn move_pressure(state: &PourState, min_moves: u32, weights: &DifficultyWeights) -> f64 {
    let expected = (weights.expected_moves_per_unit * state.params().total_units() as f64).max(1.0);
    let ratio = f64::from(min_moves) / expected;

    (weights.move_scale * ratio.powf(weights.move_exponent)).min(weights.move_cap)
}

fn fragmentation(state: &PourState, weights: &DifficultyWeights) -> f64 {
    let extra: usize = state
        .bottles()
        .iter()
        .map(|bottle| bottle.color_groups().saturating_sub(1))
        .sum();

    (weights.fragment_weight * extra as f64).min(weights.fragment_cap)
}

fn hidden_pressure(state: &PourState, weights: &DifficultyWeights) -> f64 {
    let mut weighted = 0.0;
    let mut bottles_with_hidden = 0;

    for bottle in state.bottles() {
        let mut previous = None;

        for slot in bottle.slots().iter().filter(|slot| slot.hidden) {
            weighted += match previous {
                None => weights.hidden_first,
                Some(color) if color == slot.color => weights.hidden_repeat_same,
                Some(_) => weights.hidden_repeat_mixed,
            };
            previous = Some(slot.color);
        }

        if previous.is_some() {
            bottles_with_hidden += 1;
        }
    }

    let spread = if bottles_with_hidden >= 2 {
        weights.hidden_spread_bonus * (1.0 - (-((bottles_with_hidden - 1) as f64)).exp())
    } else {
        0.0
    };

    (weighted * weights.hidden_scale + spread).min(weights.hidden_cap)
}

fn gimmick_pressure(state: &PourState, weights: &DifficultyWeights) -> f64 {
    let mut load = 0.0;
    let mut count = 0;

    for bottle in state.bottles() {
        let unit = match bottle.gimmick() {
            Gimmick::None => continue,
            Gimmick::Cloth(_) => weights.cloth,
            Gimmick::Vine => weights.vine,
            Gimmick::Bush => weights.bush,
        };
        let fill = bottle.height() as f64 / bottle.capacity().max(1) as f64;

        load += unit * fill;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    let saturated = weights.gimmick_saturation * (1.0 - (-load / weights.gimmick_softness).exp());
    let flat = weights.gimmick_flat * count.min(weights.gimmick_flat_limit) as f64;
    let relief = weights.gimmick_empty_relief * state.empty_bottle_count() as f64;

    (saturated + flat - relief).max(0.0).min(weights.gimmick_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::tests::state_from;
    use crate::pour::{Gimmick, Params, PourState};
    use crate::solver::{NoAbortController, NoProfile, Solver};
    use insta::assert_display_snapshot;
    use quickcheck_macros::quickcheck;

    fn assess_default(state: &PourState) -> Difficulty {
        let solution: Solution<NoProfile> = Solver::new(state).solve(NoAbortController);

        assess(state, &solution, &DifficultyWeights::default())
    }

    #[test]
    fn label_bands() {
        assert_eq!(DifficultyLabel::from_score(0.0), DifficultyLabel::VeryEasy);
        assert_eq!(DifficultyLabel::from_score(9.99), DifficultyLabel::VeryEasy);
        assert_eq!(DifficultyLabel::from_score(10.0), DifficultyLabel::Easy);
        assert_eq!(DifficultyLabel::from_score(25.0), DifficultyLabel::Normal);
        assert_eq!(DifficultyLabel::from_score(60.0), DifficultyLabel::Hard);
        assert_eq!(DifficultyLabel::from_score(72.0), DifficultyLabel::VeryHard);
    }

    #[test]
    fn labels_parse_back() {
        assert_eq!("Very Hard".parse(), Ok(DifficultyLabel::VeryHard));
        assert_eq!(" Easy".parse(), Ok(DifficultyLabel::Easy));
        assert!("Medium".parse::<DifficultyLabel>().is_err());
    }

    #[test]
    fn sorted_deal_is_very_easy() {
        let difficulty = assess_default(&PourState::goal(Params::new(4, 6, 4)));

        assert_display_snapshot!(difficulty.label, @"Very Easy");
        assert_eq!(difficulty.score, 0.0);
    }

    #[test]
    fn crowded_deals_stay_below_easy_cap() {
        let mut weights = DifficultyWeights::default();
        weights.move_scale = 400.0;
        weights.move_cap = 400.0;

        let state = state_from(2, &[&[1, 2], &[2, 1], &[], &[], &[]]);
        let solution: Solution<NoProfile> = Solver::new(&state).solve(NoAbortController);
        let difficulty = assess(&state, &solution, &weights);

        assert!(difficulty.breakdown.move_pressure > 100.0);
        assert!(difficulty.score <= 24.0);
        assert!(difficulty.label <= DifficultyLabel::Easy);
    }

    #[test]
    fn hidden_slots_add_pressure() {
        let plain = state_from(3, &[&[1, 2, 1], &[2, 1, 2], &[]]);
        let mut hidden = plain.clone();
        hidden.set_hidden(0, 0, true).unwrap();
        hidden.set_hidden(1, 0, true).unwrap();
        hidden.set_hidden(1, 1, true).unwrap();

        let plain = assess_default(&plain);
        let hidden = assess_default(&hidden);

        assert_eq!(plain.breakdown.hidden, 0.0);
        // 2 * (1.0 + 1.0 + 0.6) + 6 * (1 - e^-1)
        assert!((hidden.breakdown.hidden - 8.9927).abs() < 1e-3);
        assert!(hidden.score > plain.score);
    }

    #[test]
    fn gimmicks_add_pressure() {
        let plain = state_from(2, &[&[1, 2], &[2, 1], &[]]);
        let mut bush = plain.clone();
        bush.set_gimmick(1, Gimmick::Bush).unwrap();

        let bush = assess(
            &bush,
            &Solver::new(&plain).solve::<NoProfile, _>(NoAbortController),
            &DifficultyWeights::default(),
        );

        assert!(bush.breakdown.gimmick > 0.0);
        assert!(bush.breakdown.overlap == 0.0);
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let weights: DifficultyWeights = serde_json::from_str(r#"{"bush": 1.0}"#).unwrap();

        assert_eq!(weights.bush, 1.0);
        assert_eq!(weights.cloth, DifficultyWeights::default().cloth);
    }

    #[quickcheck]
    fn score_is_bounded_and_labelled(state: PourState) -> bool {
        let solution: Solution<NoProfile> =
            Solver::new(&state).solve(crate::solver::CountdownAbortController::new(5_000));
        let difficulty = assess(&state, &solution, &DifficultyWeights::default());

        difficulty.score >= 0.0
            && difficulty.score <= 100.0
            && difficulty.label == DifficultyLabel::from_score(difficulty.score)
            && (state.empty_bottle_count() < 3 || difficulty.score < 25.0)
    }
}
