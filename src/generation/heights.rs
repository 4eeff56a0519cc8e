use super::Template;
use crate::pour::Params;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightMode {
    /// Fill bottles to capacity from the left, keeping the reserved empties on the right.
    LeftToRight,
    /// Random active bottles and heights.
    Randomized,
    /// Heights of the attached template.
    Template,
}

impl Default for HeightMode {
    fn default() -> Self {
        HeightMode::LeftToRight
    }
}

pub fn allocate<R: Rng>(
    mode: HeightMode,
    params: Params,
    reserved_empty: usize,
    template: Option<&Template>,
    rng: &mut R,
) -> Vec<usize> {
    match (mode, template) {
        (_, Some(template)) => from_template(params, reserved_empty, template),
        (HeightMode::Randomized, None) => randomized(params, reserved_empty, rng),
        (HeightMode::LeftToRight, None) | (HeightMode::Template, None) => {
            left_to_right(params, reserved_empty)
        }
    }
}

pub fn left_to_right(params: Params, reserved_empty: usize) -> Vec<usize> {
    let mut heights = vec![0; params.num_bottles];
    let mut remaining = params.total_units();

    let fillable = params
        .num_bottles
        .saturating_sub(reserved_empty)
        .max(1)
        .min(params.num_bottles);

    // Units that do not fit the fillable bottles spill into the reserved ones.
    let order = (0..fillable).chain(fillable..params.num_bottles);

    for index in order {
        let take = remaining.min(params.capacity);
        heights[index] = take;
        remaining -= take;
    }

    heights
}

pub fn randomized<R: Rng>(params: Params, reserved_empty: usize, rng: &mut R) -> Vec<usize> {
    let total = params.total_units();
    if params.num_bottles == 0 || params.capacity == 0 || total == 0 {
        return vec![0; params.num_bottles];
    }

    let min_active = ((total + params.capacity - 1) / params.capacity).min(params.num_bottles);
    let max_active = params
        .num_bottles
        .saturating_sub(reserved_empty.min(1))
        .max(min_active)
        .min(total);
    let active_count = rng.gen_range(min_active, max_active + 1);

    let mut indices: Vec<usize> = (0..params.num_bottles).collect();
    indices.shuffle(rng);
    let active = &indices[..active_count];

    let mut heights = vec![0; params.num_bottles];
    for &index in active {
        heights[index] = 1;
    }

    let mut remaining = total - active_count;
    while remaining > 0 {
        let open: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&index| heights[index] < params.capacity)
            .collect();

        match open.choose(rng) {
            Some(&index) => {
                heights[index] += 1;
                remaining -= 1;
            }
            None => break,
        }
    }

    heights
}

pub fn from_template(params: Params, reserved_empty: usize, template: &Template) -> Vec<usize> {
    let mut heights: Vec<usize> = template
        .bottles
        .iter()
        .map(|bottle| bottle.height.min(params.capacity))
        .collect();
    heights.resize(params.num_bottles, 0);

    let sum: usize = heights.iter().sum();
    if sum != params.total_units() {
        warn!(
            "template heights sum to {} instead of {}, filling from the left",
            sum,
            params.total_units()
        );
        return left_to_right(params, reserved_empty);
    }

    heights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::PourState;
    use quickcheck_macros::quickcheck;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn left_to_right_leaves_reserved_empties() {
        assert_eq!(left_to_right(Params::new(3, 5, 4), 2), vec![4, 4, 4, 0, 0]);
    }

    #[test]
    fn left_to_right_spills_when_too_few_bottles_are_fillable() {
        assert_eq!(left_to_right(Params::new(4, 5, 2), 3), vec![2, 2, 2, 2, 0]);
    }

    #[test]
    fn inconsistent_template_falls_back() {
        let params = Params::new(2, 4, 3);
        let mut template = Template::from_state(&PourState::goal(params));
        template.bottles[3].height = 2;

        assert_eq!(from_template(params, 2, &template), vec![3, 3, 0, 0]);
    }

    #[quickcheck]
    fn randomized_heights_sum_to_all_units(colors: u8, extra: u8, capacity: u8, seed: u64) -> bool {
        let capacity = usize::from(capacity % 6) + 1;
        let colors = usize::from(colors % 8) + 1;
        let params = Params::new(colors, colors + usize::from(extra % 3), capacity);

        let heights = randomized(params, 2, &mut SmallRng::seed_from_u64(seed));

        heights.iter().sum::<usize>() == params.total_units()
            && heights.iter().all(|&height| height <= capacity)
    }
}
