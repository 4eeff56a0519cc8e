use crate::pour::{Color, Gimmick, Params};
use log::debug;

/// A full-height bottle set aside to collect `color`, so the gimmick at
/// `gimmick` has a way to unlock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Support {
    pub bottle: usize,
    pub color: Color,
    pub gimmick: usize,
}

pub fn plan(params: Params, heights: &[usize], gimmicks: &[Gimmick]) -> Vec<Support> {
    let mut supports: Vec<Support> = Vec::new();

    let eligible = |index: usize, supports: &[Support]| {
        heights.get(index) == Some(&params.capacity)
            && gimmicks.get(index).copied().unwrap_or_default().is_none()
            && supports.iter().all(|support| support.bottle != index)
    };

    for (index, gimmick) in gimmicks.iter().enumerate() {
        if let Gimmick::Cloth(target) = *gimmick {
            let mut candidates: Vec<usize> = (0..params.num_bottles)
                .filter(|&other| other != index && eligible(other, &supports))
                .collect();
            candidates.sort_by_key(|&other| (distance(index, other), other));

            match candidates.first() {
                Some(&bottle) => supports.push(Support {
                    bottle,
                    color: target,
                    gimmick: index,
                }),
                None => debug!("no support bottle for cloth at {}", index),
            }
        }
    }

    for (index, gimmick) in gimmicks.iter().enumerate() {
        if *gimmick != Gimmick::Bush {
            continue;
        }

        let neighbour = [index.checked_sub(1), Some(index + 1)]
            .iter()
            .flatten()
            .copied()
            .find(|&other| eligible(other, &supports));
        let color = Color::palette(params.num_colors)
            .find(|color| supports.iter().all(|support| support.color != *color));

        match (neighbour, color) {
            (Some(bottle), Some(color)) => supports.push(Support {
                bottle,
                color,
                gimmick: index,
            }),
            _ => debug!("no support bottle for bush at {}", index),
        }
    }

    supports
}

fn distance(a: usize, b: usize) -> usize {
    if a > b {
        a - b
    } else {
        b - a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(value: u8) -> Color {
        Color::new(value).unwrap()
    }

    #[test]
    fn cloth_takes_the_nearest_full_bottle() {
        let gimmicks = [
            Gimmick::None,
            Gimmick::None,
            Gimmick::Cloth(color(2)),
            Gimmick::None,
            Gimmick::None,
        ];
        let supports = plan(Params::new(3, 5, 4), &[4, 4, 4, 0, 0], &gimmicks);

        assert_eq!(
            supports,
            vec![Support {
                bottle: 1,
                color: color(2),
                gimmick: 2
            }]
        );
    }

    #[test]
    fn bush_reserves_a_neighbour_for_an_unused_colour() {
        let gimmicks = [
            Gimmick::Cloth(color(1)),
            Gimmick::None,
            Gimmick::Bush,
            Gimmick::None,
            Gimmick::None,
        ];
        let supports = plan(Params::new(3, 5, 2), &[0, 2, 2, 2, 0], &gimmicks);

        assert_eq!(supports[0].bottle, 1);

        assert_eq!(
            supports[1],
            Support {
                bottle: 3,
                color: color(2),
                gimmick: 2
            }
        );
    }
}
