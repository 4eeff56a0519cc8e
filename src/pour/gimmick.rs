use super::{Bottle, Color};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A per-bottle rule modifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gimmick {
    None,
    /// Locked until the target colour is mono-full in some other bottle.
    Cloth(Color),
    /// Can never be poured out of.
    Vine,
    /// Locked until a neighbouring bottle is mono-full.
    Bush,
}

impl Default for Gimmick {
    fn default() -> Self {
        Gimmick::None
    }
}

impl Gimmick {
    pub fn from_code(kind: u8, param: u8) -> Option<Gimmick> {
        match kind {
            0 => Some(Gimmick::None),
            1 => Color::new(param).map(Gimmick::Cloth),
            2 => Some(Gimmick::Vine),
            3 => Some(Gimmick::Bush),
            _ => None,
        }
    }

    pub fn kind_code(self) -> u8 {
        match self {
            Gimmick::None => 0,
            Gimmick::Cloth(_) => 1,
            Gimmick::Vine => 2,
            Gimmick::Bush => 3,
        }
    }

    pub fn param(self) -> u8 {
        match self {
            Gimmick::Cloth(target) => target.get(),
            _ => 0,
        }
    }

    pub fn is_none(self) -> bool {
        self == Gimmick::None
    }
}

impl Display for Gimmick {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Gimmick::None => Ok(()),
            Gimmick::Cloth(target) => write!(f, "cloth:{}", target),
            Gimmick::Vine => f.write_str("vine"),
            Gimmick::Bush => f.write_str("bush"),
        }
    }
}

/// Lock flags derived from bottle contents and gimmicks. Never set directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Locks {
    bush_locked: Vec<bool>,
    cloth_locked: Vec<bool>,
}

impl Locks {
    pub fn derive(bottles: &[Bottle]) -> Locks {
        let completed: Vec<(usize, Color)> = bottles
            .iter()
            .enumerate()
            .filter(|(_, bottle)| bottle.is_mono_full())
            .filter_map(|(index, bottle)| bottle.top_color().map(|color| (index, color)))
            .collect();

        let mut bush_locked = vec![false; bottles.len()];
        let mut cloth_locked = vec![false; bottles.len()];

        for (index, bottle) in bottles.iter().enumerate() {
            match bottle.gimmick() {
                Gimmick::Cloth(target) => {
                    cloth_locked[index] = !completed
                        .iter()
                        .any(|&(other, color)| other != index && color == target);
                }
                Gimmick::Bush => {
                    let left = index > 0 && bottles[index - 1].is_mono_full();
                    let right = index + 1 < bottles.len() && bottles[index + 1].is_mono_full();
                    bush_locked[index] = !(left || right);
                }
                Gimmick::None | Gimmick::Vine => {}
            }
        }

        Locks {
            bush_locked,
            cloth_locked,
        }
    }

    pub fn is_bush_locked(&self, index: usize) -> bool {
        self.bush_locked.get(index).copied().unwrap_or(false)
    }

    pub fn is_cloth_locked(&self, index: usize) -> bool {
        self.cloth_locked.get(index).copied().unwrap_or(false)
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.is_bush_locked(index) || self.is_cloth_locked(index)
    }

    pub fn locked_count(&self) -> usize {
        (0..self.bush_locked.len())
            .filter(|&index| self.is_locked(index))
            .count()
    }
}
