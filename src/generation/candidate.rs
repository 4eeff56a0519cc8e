mod placement;

use super::Support;
use crate::pour::{Bottle, Color, Gimmick, Params, Slot};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Knobs of a single fill.
#[derive(Copy, Clone, Debug)]
pub struct FillOptions {
    pub max_run: usize,
    pub tries: usize,
}

/// Deals every colour unit into bottles of the given heights.
///
/// Support units are planted first at the bottom of their bottles and vines are
/// seeded with a single colour, then the rest of the bag is shuffled and placed
/// one unit at a time through the tiered placement policy.
pub fn fill<R: Rng>(
    params: Params,
    heights: &[usize],
    gimmicks: &[Gimmick],
    supports: &[Support],
    options: FillOptions,
    rng: &mut R,
) -> Vec<Bottle> {
    let mut bottles: Vec<Bottle> = (0..params.num_bottles)
        .map(|index| {
            Bottle::new(params.capacity).with_gimmick(gimmicks.get(index).copied().unwrap_or_default())
        })
        .collect();

    let colors: Vec<Color> = Color::palette(params.num_colors).collect();
    let mut remaining = vec![params.capacity; colors.len()];

    for support in supports {
        let slot = usize::from(support.color.get()) - 1;
        if remaining.get(slot).copied().unwrap_or(0) > 0
            && bottles[support.bottle].height() < heights[support.bottle]
        {
            bottles[support.bottle].push(Slot::new(support.color));
            remaining[slot] -= 1;
        }
    }

    seed_vines(&mut bottles, heights, &colors, &mut remaining, rng);

    let mut bag: Vec<Color> = colors
        .iter()
        .zip(remaining.iter())
        .flat_map(|(&color, &count)| std::iter::repeat(color).take(count))
        .collect();
    bag.shuffle(rng);

    let mut relaxed = 0;
    for color in bag {
        match placement::place(
            &mut bottles,
            heights,
            supports,
            options.max_run,
            options.tries,
            color,
            rng,
        ) {
            Some(0) => {}
            Some(_) => relaxed += 1,
            None => debug!("no bottle has room for colour {}", color),
        }
    }

    if relaxed > 0 {
        debug!("{} units needed a relaxed placement", relaxed);
    }

    bottles
}

fn seed_vines<R: Rng>(
    bottles: &mut [Bottle],
    heights: &[usize],
    colors: &[Color],
    remaining: &mut [usize],
    rng: &mut R,
) {
    let mut used: Vec<Color> = Vec::new();

    for index in 0..bottles.len() {
        if bottles[index].gimmick() != Gimmick::Vine || !bottles[index].is_empty() {
            continue;
        }

        let height = heights[index];
        if height == 0 {
            continue;
        }

        let fits = |slot: usize| remaining[slot] >= height;
        let fresh: Vec<usize> = (0..colors.len())
            .filter(|&slot| fits(slot) && !used.contains(&colors[slot]))
            .collect();
        let any: Vec<usize> = (0..colors.len()).filter(|&slot| fits(slot)).collect();
        let pool = if fresh.is_empty() { &any } else { &fresh };

        if let Some(&slot) = pool.choose(rng) {
            for _ in 0..height {
                bottles[index].push(Slot::new(colors[slot]));
            }
            remaining[slot] -= height;
            used.push(colors[slot]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const OPTIONS: FillOptions = FillOptions {
        max_run: 2,
        tries: 64,
    };

    fn color(value: u8) -> Color {
        Color::new(value).unwrap()
    }

    #[test]
    fn fills_every_bottle_to_its_height() {
        let params = Params::new(5, 7, 4);
        let heights = [4, 4, 4, 4, 4, 0, 0];
        let mut rng = SmallRng::seed_from_u64(0);

        for _ in 0..20 {
            let bottles = fill(params, &heights, &[], &[], OPTIONS, &mut rng);

            for (bottle, &height) in bottles.iter().zip(heights.iter()) {
                assert_eq!(bottle.height(), height);
            }
            for color in Color::palette(5) {
                let count: usize = bottles.iter().map(|bottle| bottle.count_of(color)).sum();
                assert_eq!(count, 4);
            }
        }
    }

    #[test]
    fn vines_are_seeded_monochrome() {
        let params = Params::new(4, 6, 3);
        let heights = [3, 3, 3, 3, 0, 0];
        let gimmicks = [
            Gimmick::Vine,
            Gimmick::Cloth(color(2)),
            Gimmick::None,
            Gimmick::None,
            Gimmick::None,
            Gimmick::None,
        ];
        let mut rng = SmallRng::seed_from_u64(5);

        for _ in 0..20 {
            let bottles = fill(params, &heights, &gimmicks, &[], OPTIONS, &mut rng);

            assert_eq!(bottles[0].color_groups(), 1);
            assert_eq!(bottles[0].height(), 3);
        }
    }

    #[test]
    fn supports_are_planted_at_the_bottom() {
        let params = Params::new(3, 5, 3);
        let heights = [3, 3, 3, 0, 0];
        let supports = [Support {
            bottle: 2,
            color: color(3),
            gimmick: 0,
        }];
        let bottles = fill(
            params,
            &heights,
            &[],
            &supports,
            OPTIONS,
            &mut SmallRng::seed_from_u64(2),
        );

        assert_eq!(bottles[2].slots()[0].color, color(3));
    }

    #[test]
    fn same_seed_same_deal() {
        let params = Params::new(4, 6, 4);
        let heights = [4, 4, 4, 4, 0, 0];

        let first = fill(params, &heights, &[], &[], OPTIONS, &mut SmallRng::seed_from_u64(42));
        let second = fill(params, &heights, &[], &[], OPTIONS, &mut SmallRng::seed_from_u64(42));

        assert_eq!(first, second);
    }
}
