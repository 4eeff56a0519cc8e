use crate::generation::Support;
use crate::pour::{Bottle, Color, Gimmick, Slot};
use rand::Rng;

/// Everything a placement constraint may look at.
pub struct Placement<'a> {
    pub bottles: &'a [Bottle],
    pub heights: &'a [usize],
    pub supports: &'a [Support],
    /// Zero disables the limit.
    pub max_run: usize,
}

type Constraint = fn(&Placement, usize, Color) -> bool;

fn has_room(placement: &Placement, index: usize, _color: Color) -> bool {
    placement.bottles[index].height() < placement.heights[index]
}

fn vine_monochrome(placement: &Placement, index: usize, color: Color) -> bool {
    let bottle = &placement.bottles[index];

    bottle.gimmick() != Gimmick::Vine || bottle.slots().iter().all(|slot| slot.color == color)
}

fn cloth_refuses_target(placement: &Placement, index: usize, color: Color) -> bool {
    placement.bottles[index].gimmick() != Gimmick::Cloth(color)
}

// A support bottle takes no colour another support has claimed.
fn reserved_exclusive(placement: &Placement, index: usize, color: Color) -> bool {
    let supports = placement.supports;
    let own_claims_other = supports
        .iter()
        .any(|support| support.bottle == index && support.color != color);
    let claimed_elsewhere = supports
        .iter()
        .any(|support| support.bottle != index && support.color == color);

    !(own_claims_other && claimed_elsewhere)
}

fn within_run_limit(placement: &Placement, index: usize, color: Color) -> bool {
    placement.max_run == 0 || placement.bottles[index].run_length(color) < placement.max_run
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Search {
    /// Random bottles, a bounded number of tries.
    Random,
    /// Every bottle, left to right.
    Scan,
}

struct Tier {
    constraints: &'static [Constraint],
    search: Search,
}

impl Tier {
    fn admits(&self, placement: &Placement, index: usize, color: Color) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint(placement, index, color))
    }
}

/// Strictest first. The last tier only needs room, so every unit lands somewhere
/// as long as the heights add up.
const TIERS: &[Tier] = &[
    Tier {
        constraints: &[
            has_room,
            vine_monochrome,
            cloth_refuses_target,
            reserved_exclusive,
            within_run_limit,
        ],
        search: Search::Random,
    },
    Tier {
        constraints: &[
            has_room,
            vine_monochrome,
            cloth_refuses_target,
            reserved_exclusive,
        ],
        search: Search::Scan,
    },
    Tier {
        constraints: &[has_room, vine_monochrome],
        search: Search::Scan,
    },
    Tier {
        constraints: &[has_room],
        search: Search::Scan,
    },
];

/// Places one unit of `color`. Returns the tier that accepted it, or `None`
/// when no bottle has room.
pub fn place<R: Rng>(
    bottles: &mut [Bottle],
    heights: &[usize],
    supports: &[Support],
    max_run: usize,
    tries: usize,
    color: Color,
    rng: &mut R,
) -> Option<usize> {
    if bottles.is_empty() {
        return None;
    }

    for (level, tier) in TIERS.iter().enumerate() {
        let chosen = {
            let placement = Placement {
                bottles: &*bottles,
                heights,
                supports,
                max_run,
            };
            let count = bottles.len();

            match tier.search {
                Search::Random => (0..tries)
                    .map(|_| rng.gen_range(0, count))
                    .find(|&index| tier.admits(&placement, index, color)),
                Search::Scan => (0..count).find(|&index| tier.admits(&placement, index, color)),
            }
        };

        if let Some(index) = chosen {
            bottles[index].push(Slot::new(color));
            return Some(level);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn color(value: u8) -> Color {
        Color::new(value).unwrap()
    }

    fn bottle(capacity: usize, colors: &[u8]) -> Bottle {
        Bottle::with_slots(
            capacity,
            colors.iter().map(|&value| Slot::new(color(value))).collect(),
        )
    }

    #[test]
    fn cloth_bottle_refuses_its_target_until_forced() {
        let mut bottles = vec![
            Bottle::new(2).with_gimmick(Gimmick::Cloth(color(1))),
            bottle(2, &[2]),
        ];
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(place(&mut bottles, &[2, 2], &[], 2, 64, color(1), &mut rng), Some(0));
        assert_eq!(bottles[1].count_of(color(1)), 1);

        assert_eq!(place(&mut bottles, &[2, 2], &[], 2, 64, color(1), &mut rng), Some(2));
        assert_eq!(bottles[0].count_of(color(1)), 1);
    }

    #[test]
    fn run_limit_is_dropped_before_other_constraints() {
        let mut bottles = vec![bottle(3, &[1, 1])];
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(place(&mut bottles, &[3], &[], 2, 8, color(1), &mut rng), Some(1));
        assert!(bottles[0].is_mono_full());
    }

    #[test]
    fn vine_stays_monochrome_while_alternatives_exist() {
        let mut bottles = vec![
            bottle(2, &[3]).with_gimmick(Gimmick::Vine),
            Bottle::new(2),
        ];
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(place(&mut bottles, &[2, 2], &[], 0, 64, color(1), &mut rng), Some(0));
        assert_eq!(bottles[0].count_of(color(1)), 0);
    }

    #[test]
    fn support_bottles_keep_other_claims_out() {
        let supports = [
            Support {
                bottle: 0,
                color: color(1),
                gimmick: 2,
            },
            Support {
                bottle: 1,
                color: color(2),
                gimmick: 3,
            },
        ];
        let mut bottles = vec![bottle(3, &[1]), bottle(3, &[2]), Bottle::new(3)];
        let mut rng = SmallRng::seed_from_u64(0);

        for _ in 0..2 {
            place(&mut bottles, &[3, 3, 3], &supports, 0, 64, color(2), &mut rng);
        }

        assert_eq!(bottles[0].count_of(color(2)), 0);
    }

    #[test]
    fn no_room_places_nothing() {
        let mut bottles = vec![bottle(1, &[1])];
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(place(&mut bottles, &[1], &[], 0, 8, color(2), &mut rng), None);
    }
}
