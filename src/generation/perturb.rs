use super::Support;
use crate::pour::{Bottle, Color, Gimmick};
use rand::seq::SliceRandom;
use rand::Rng;

type SlotRef = (usize, usize);

fn color_at(bottles: &[Bottle], (bottle, slot): SlotRef) -> Option<Color> {
    bottles[bottle].slots().get(slot).map(|slot| slot.color)
}

fn accepts(bottle: &Bottle, color: Color) -> bool {
    match bottle.gimmick() {
        Gimmick::Cloth(target) => target != color,
        Gimmick::Vine => false,
        Gimmick::None | Gimmick::Bush => true,
    }
}

fn swap_colors(bottles: &mut [Bottle], a: SlotRef, b: SlotRef) {
    if let (Some(first), Some(second)) = (color_at(bottles, a), color_at(bottles, b)) {
        bottles[a.0].set_color(a.1, second);
        bottles[b.0].set_color(b.1, first);
    }
}

/// Moves each planted support unit from the bottom to a random slot of its bottle.
pub fn scatter_supports<R: Rng>(bottles: &mut [Bottle], supports: &[Support], rng: &mut R) {
    for support in supports {
        let bottle = &mut bottles[support.bottle];
        if bottle.height() > 1 {
            let target = rng.gen_range(0, bottle.height());
            bottle.swap_slots(0, target);
        }
    }
}

/// Swaps every cloth target unit sitting in its own cloth bottle with a
/// non-target unit from another bottle.
pub fn fix_cloth_targets<R: Rng>(bottles: &mut [Bottle], rng: &mut R) {
    for index in 0..bottles.len() {
        let target = match bottles[index].gimmick() {
            Gimmick::Cloth(target) => target,
            _ => continue,
        };

        for slot in 0..bottles[index].height() {
            if color_at(bottles, (index, slot)) != Some(target) {
                continue;
            }

            let partners: Vec<SlotRef> = partner_slots(bottles, index, |color, other| {
                color != target && accepts(other, target)
            });

            if let Some(&partner) = partners.choose(rng) {
                swap_colors(bottles, (index, slot), partner);
            }
        }
    }
}

/// Mono-full bottles that are not vines. Vines are monochrome on purpose.
pub fn presolved(bottles: &[Bottle]) -> Vec<usize> {
    bottles
        .iter()
        .enumerate()
        .filter(|(_, bottle)| bottle.is_mono_full() && bottle.gimmick() != Gimmick::Vine)
        .map(|(index, _)| index)
        .collect()
}

/// Breaks up mono-full bottles by swapping one of their units with a
/// different colour elsewhere. Returns whether every such bottle was broken.
pub fn break_presolved<R: Rng>(bottles: &mut [Bottle], rng: &mut R) -> bool {
    for _ in 0..bottles.len() * 2 {
        let index = match presolved(bottles).first() {
            Some(&index) => index,
            None => return true,
        };
        let color = match bottles[index].top_color() {
            Some(color) => color,
            None => return false,
        };

        let own = &bottles[index];
        let partners: Vec<SlotRef> = partner_slots(bottles, index, |other_color, other| {
            other_color != color && accepts(own, other_color) && accepts(other, color)
        });

        match partners.choose(rng) {
            Some(&partner) => {
                let slot = rng.gen_range(0, bottles[index].height());
                swap_colors(bottles, (index, slot), partner);
            }
            None => return false,
        }
    }

    presolved(bottles).is_empty()
}

fn partner_slots<F>(bottles: &[Bottle], except: usize, admits: F) -> Vec<SlotRef>
where
    F: Fn(Color, &Bottle) -> bool,
{
    bottles
        .iter()
        .enumerate()
        .filter(|&(index, bottle)| index != except && bottle.gimmick() != Gimmick::Vine)
        .flat_map(|(index, bottle)| {
            bottle
                .slots()
                .iter()
                .enumerate()
                .filter(|(_, slot)| admits(slot.color, bottle))
                .map(move |(slot, _)| (index, slot))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pour::Slot;
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

    fn colors(bottle: &Bottle) -> Vec<u8> {
        bottle.slots().iter().map(|slot| slot.color.get()).collect()
    }

    #[test]
    fn cloth_loses_its_target_colour() {
        let mut bottles = vec![
            bottle(3, &[2, 1, 2]).with_gimmick(Gimmick::Cloth(color(2))),
            bottle(3, &[1, 3, 3]),
            bottle(3, &[3, 1, 2]).with_gimmick(Gimmick::Vine),
        ];

        fix_cloth_targets(&mut bottles, &mut SmallRng::seed_from_u64(1));

        assert_eq!(bottles[0].count_of(color(2)), 0);
        assert_eq!(colors(&bottles[2]), vec![3, 1, 2]);
    }

    #[test]
    fn presolved_bottles_are_broken() {
        let mut bottles = vec![
            bottle(2, &[1, 1]),
            bottle(2, &[2, 3]),
            bottle(2, &[3, 2]),
            bottle(2, &[4, 4]).with_gimmick(Gimmick::Vine),
        ];

        assert_eq!(presolved(&bottles), vec![0]);
        assert!(break_presolved(&mut bottles, &mut SmallRng::seed_from_u64(9)));
        assert!(presolved(&bottles).is_empty());
        assert!(bottles[3].is_mono_full());
    }

    #[test]
    fn support_unit_stays_in_its_bottle() {
        let mut bottles = vec![bottle(4, &[3, 1, 2, 1])];
        let supports = [Support {
            bottle: 0,
            color: color(3),
            gimmick: 1,
        }];

        scatter_supports(&mut bottles, &supports, &mut SmallRng::seed_from_u64(4));

        assert_eq!(bottles[0].count_of(color(3)), 1);
        assert_eq!(bottles[0].height(), 4);
    }
}
