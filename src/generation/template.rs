use crate::pour::{Color, Gimmick, Params, PourError, PourState};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateBottle {
    pub height: usize,
    pub gimmick: Gimmick,
    /// Hidden flag per slot, bottom to top.
    pub hidden: Vec<bool>,
}

/// Heights, gimmicks and hidden layout that generated puzzles must keep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub params: Params,
    pub bottles: Vec<TemplateBottle>,
}

/// Gimmick and hidden-slot counts for an automatically built template.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRequest {
    pub cloth: usize,
    pub vine: usize,
    pub bush: usize,
    pub hidden: usize,
    /// Zero means no per-bottle limit.
    pub hidden_per_bottle_cap: usize,
}

impl TemplateRequest {
    pub fn gimmick_count(&self) -> usize {
        self.cloth + self.vine + self.bush
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("{requested} gimmicks requested but only {usable} bottles hold liquid")]
    TooManyGimmicks { requested: usize, usable: usize },
    #[error("bottle heights sum to {found} units, the puzzle needs exactly {expected}")]
    HeightMismatch { found: usize, expected: usize },
    #[error("{requested} hidden slots requested but only {eligible} slots may be hidden")]
    HiddenQuota { requested: usize, eligible: usize },
    #[error("bush {0} has no full neighbouring bottle free of gimmicks")]
    BushNeedsNeighbour(usize),
    #[error("template describes {found} bottles, the puzzle has {expected}")]
    BottleCount { found: usize, expected: usize },
}

impl Template {
    pub fn from_state(state: &PourState) -> Template {
        Template {
            params: state.params(),
            bottles: state
                .bottles()
                .iter()
                .map(|bottle| TemplateBottle {
                    height: bottle.height(),
                    gimmick: bottle.gimmick(),
                    hidden: bottle.slots().iter().map(|slot| slot.hidden).collect(),
                })
                .collect(),
        }
    }

    pub fn heights(&self) -> Vec<usize> {
        self.bottles.iter().map(|bottle| bottle.height).collect()
    }

    pub fn gimmicks(&self) -> Vec<Gimmick> {
        self.bottles.iter().map(|bottle| bottle.gimmick).collect()
    }

    pub fn hidden_count(&self) -> usize {
        self.bottles
            .iter()
            .map(|bottle| bottle.hidden.iter().filter(|&&hidden| hidden).count())
            .sum()
    }

    pub fn check(&self, params: Params) -> Result<(), TemplateError> {
        if self.bottles.len() != params.num_bottles {
            return Err(TemplateError::BottleCount {
                found: self.bottles.len(),
                expected: params.num_bottles,
            });
        }

        Ok(())
    }

    /// Copies gimmicks onto `state`. Bottles past either end are left alone.
    pub fn apply_gimmicks(&self, state: &mut PourState) -> Result<(), PourError> {
        let count = state.bottles().len();

        for (index, bottle) in (0..count).zip(self.bottles.iter()) {
            state.set_gimmick(index, bottle.gimmick)?;
        }

        Ok(())
    }

    /// Copies hidden flags onto `state`. Top slots always stay visible.
    pub fn apply_hidden(&self, state: &mut PourState) -> Result<(), PourError> {
        let heights: Vec<usize> = state.bottles().iter().map(|bottle| bottle.height()).collect();

        for ((index, height), template_bottle) in
            heights.into_iter().enumerate().zip(self.bottles.iter())
        {
            let below_top = template_bottle
                .hidden
                .iter()
                .take(height.saturating_sub(1))
                .enumerate();

            for (slot, &hidden) in below_top {
                if hidden {
                    state.set_hidden(index, slot, true)?;
                }
            }
        }

        Ok(())
    }
}

/// Total hidden slots available: every slot but the top, up to the per-bottle cap.
pub fn eligible_hidden(heights: &[usize], cap: usize) -> usize {
    heights
        .iter()
        .map(|&height| {
            let below_top = height.saturating_sub(1);
            if cap == 0 {
                below_top
            } else {
                below_top.min(cap)
            }
        })
        .sum()
}

pub fn validate(
    params: Params,
    heights: &[usize],
    request: &TemplateRequest,
) -> Result<(), TemplateError> {
    let usable = heights.iter().filter(|&&height| height > 0).count();
    if request.gimmick_count() > usable {
        return Err(TemplateError::TooManyGimmicks {
            requested: request.gimmick_count(),
            usable,
        });
    }

    let found = heights.iter().sum();
    if found != params.total_units() {
        return Err(TemplateError::HeightMismatch {
            found,
            expected: params.total_units(),
        });
    }

    let eligible = eligible_hidden(heights, request.hidden_per_bottle_cap);
    if request.hidden > eligible {
        return Err(TemplateError::HiddenQuota {
            requested: request.hidden,
            eligible,
        });
    }

    Ok(())
}

/// Places the requested gimmicks and hidden slots over `heights`.
pub fn build<R: Rng>(
    params: Params,
    heights: &[usize],
    request: &TemplateRequest,
    rng: &mut R,
) -> Result<Template, TemplateError> {
    validate(params, heights, request)?;

    let mut order: Vec<usize> = (0..heights.len())
        .filter(|&index| heights[index] > 0)
        .collect();
    order.shuffle(rng);

    let mut gimmicks = vec![Gimmick::None; heights.len()];
    let mut kept_plain = vec![false; heights.len()];

    // Bushes go first, each keeps one full neighbour free of gimmicks.
    for bush in 0..request.bush {
        let placement = order.iter().copied().find_map(|index| {
            if !gimmicks[index].is_none() || kept_plain[index] {
                return None;
            }

            [index.checked_sub(1), Some(index + 1)]
                .iter()
                .flatten()
                .copied()
                .find(|&other| {
                    heights.get(other) == Some(&params.capacity) && gimmicks[other].is_none()
                })
                .map(|neighbour| (index, neighbour))
        });

        match placement {
            Some((index, neighbour)) => {
                gimmicks[index] = Gimmick::Bush;
                kept_plain[neighbour] = true;
            }
            None => return Err(TemplateError::BushNeedsNeighbour(bush)),
        }
    }

    let mut free = order
        .iter()
        .copied()
        .filter(|&index| gimmicks[index].is_none() && !kept_plain[index])
        .collect::<Vec<_>>()
        .into_iter();
    let colors: Vec<Color> = Color::palette(params.num_colors).collect();

    for _ in 0..request.cloth {
        let index = free.next().ok_or(TemplateError::TooManyGimmicks {
            requested: request.gimmick_count(),
            usable: order.len(),
        })?;
        if let Some(&target) = colors.choose(rng) {
            gimmicks[index] = Gimmick::Cloth(target);
        }
    }

    for _ in 0..request.vine {
        let index = free.next().ok_or(TemplateError::TooManyGimmicks {
            requested: request.gimmick_count(),
            usable: order.len(),
        })?;
        gimmicks[index] = Gimmick::Vine;
    }

    let hidden = place_hidden(heights, request, rng);

    Ok(Template {
        params,
        bottles: heights
            .iter()
            .zip(gimmicks)
            .zip(hidden)
            .map(|((&height, gimmick), hidden)| TemplateBottle {
                height,
                gimmick,
                hidden,
            })
            .collect(),
    })
}

fn place_hidden<R: Rng>(heights: &[usize], request: &TemplateRequest, rng: &mut R) -> Vec<Vec<bool>> {
    let mut hidden: Vec<Vec<bool>> = heights.iter().map(|&height| vec![false; height]).collect();
    let mut per_bottle = vec![0; heights.len()];

    let mut positions: Vec<(usize, usize)> = heights
        .iter()
        .enumerate()
        .flat_map(|(index, &height)| (0..height.saturating_sub(1)).map(move |slot| (index, slot)))
        .collect();
    positions.shuffle(rng);

    let mut placed = 0;
    for (index, slot) in positions {
        if placed == request.hidden {
            break;
        }
        if request.hidden_per_bottle_cap != 0 && per_bottle[index] >= request.hidden_per_bottle_cap
        {
            continue;
        }

        hidden[index][slot] = true;
        per_bottle[index] += 1;
        placed += 1;
    }

    hidden
}
