mod bottle;
mod gimmick;

pub use bottle::{Bottle, Slot};
pub use gimmick::{Gimmick, Locks};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU8;
use thiserror::Error;

/// A colour tag. The empty sentinel `0` is represented by `Option::None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(NonZeroU8);

impl Color {
    pub fn new(value: u8) -> Option<Color> {
        NonZeroU8::new(value).map(Color)
    }

    pub fn get(self) -> u8 {
        self.0.get()
    }

    /// Colours `1..=count`.
    pub fn palette(count: usize) -> impl Iterator<Item = Color> {
        (1..=count.min(u8::MAX as usize)).filter_map(|value| Color::new(value as u8))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
    pub num_colors: usize,
    pub num_bottles: usize,
    pub capacity: usize,
}

impl Params {
    pub fn new(num_colors: usize, num_bottles: usize, capacity: usize) -> Params {
        Params {
            num_colors,
            num_bottles,
            capacity,
        }
    }

    /// Every colour contributes exactly `capacity` units.
    pub fn total_units(&self) -> usize {
        self.num_colors * self.capacity
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::new(6, 8, 4)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub amount: usize,
}

impl Move {
    pub fn new(from: usize, to: usize, amount: usize) -> Move {
        Move { from, to, amount }
    }

    pub fn is_reverse_of(&self, other: &Move) -> bool {
        self.from == other.to && self.to == other.from
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} -> {} x{}", self.from, self.to, self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PourError {
    #[error("cannot pour a bottle into itself")]
    SameBottle,
    #[error("bottle {0} does not exist")]
    OutOfRange(usize),
    #[error("bottle {0} is empty")]
    SourceEmpty(usize),
    #[error("bottle {0} is full")]
    DestinationFull(usize),
    #[error("bottle {0} is a vine and cannot be poured out of")]
    VineSource(usize),
    #[error("bottle {0} is locked by its gimmick")]
    Locked(usize),
    #[error("top colours of bottles {from} and {to} differ")]
    ColorMismatch { from: usize, to: usize },
    #[error("the top of bottle {0} is hidden")]
    HiddenTop(usize),
    #[error("cannot move {amount} units, only {available} can move")]
    InvalidAmount { amount: usize, available: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PourState {
    params: Params,
    bottles: Vec<Bottle>,
    locks: Locks,
}

impl PourState {
    pub fn new(params: Params, bottles: Vec<Bottle>) -> PourState {
        let locks = Locks::derive(&bottles);

        PourState {
            params,
            bottles,
            locks,
        }
    }

    /// The sorted arrangement: bottle `c - 1` is mono-full in colour `c`, the rest are empty.
    pub fn goal(params: Params) -> PourState {
        let mut colors = Color::palette(params.num_colors);

        let bottles = (0..params.num_bottles)
            .map(|_| match colors.next() {
                Some(color) => {
                    Bottle::with_slots(params.capacity, vec![Slot::new(color); params.capacity])
                }
                None => Bottle::new(params.capacity),
            })
            .collect();

        PourState::new(params, bottles)
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    pub fn bottle(&self, index: usize) -> Option<&Bottle> {
        self.bottles.get(index)
    }

    pub fn locks(&self) -> &Locks {
        &self.locks
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.locks.is_locked(index)
    }

    pub fn refresh_locks(&mut self) {
        self.locks = Locks::derive(&self.bottles);
    }

    /// How many units a pour from `from` into `to` would move.
    pub fn can_pour(&self, from: usize, to: usize) -> Result<usize, PourError> {
        self.check_pour(from, to, true)
    }

    /// As `can_pour`, without requiring the destination top colour to match.
    /// Used to scramble sorted arrangements.
    pub fn can_pour_relaxed(&self, from: usize, to: usize) -> Result<usize, PourError> {
        self.check_pour(from, to, false)
    }

    fn check_pour(&self, from: usize, to: usize, match_colors: bool) -> Result<usize, PourError> {
        if from == to {
            return Err(PourError::SameBottle);
        }

        let source = self.bottles.get(from).ok_or(PourError::OutOfRange(from))?;
        let destination = self.bottles.get(to).ok_or(PourError::OutOfRange(to))?;

        if source.is_empty() {
            return Err(PourError::SourceEmpty(from));
        }
        if destination.is_full() {
            return Err(PourError::DestinationFull(to));
        }
        if source.gimmick() == Gimmick::Vine {
            return Err(PourError::VineSource(from));
        }
        if self.locks.is_locked(from) {
            return Err(PourError::Locked(from));
        }
        if self.locks.is_locked(to) {
            return Err(PourError::Locked(to));
        }

        if match_colors {
            if let (Some(source_top), Some(destination_top)) =
                (source.top_color(), destination.top_color())
            {
                if source_top != destination_top {
                    return Err(PourError::ColorMismatch { from, to });
                }
            }
        }

        match source.top_chunk().min(destination.free_space()) {
            0 => Err(PourError::HiddenTop(from)),
            amount => Ok(amount),
        }
    }

    /// Every legal pour, over all ordered bottle pairs.
    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        let count = self.bottles.len();

        (0..count).flat_map(move |from| {
            (0..count).filter_map(move |to| {
                self.can_pour(from, to)
                    .ok()
                    .map(|amount| Move::new(from, to, amount))
            })
        })
    }

    pub fn has_any_move(&self) -> bool {
        self.legal_moves().next().is_some()
    }

    /// Pours as much as the rules allow from `from` into `to`.
    pub fn pour(&mut self, from: usize, to: usize) -> Result<Move, PourError> {
        let amount = self.can_pour(from, to)?;
        let pour_move = Move::new(from, to, amount);

        self.transfer(pour_move);

        Ok(pour_move)
    }

    /// Transfers `amount` units top to top. Only the structure is checked,
    /// so replaying a recorded trace does not depend on colour matching.
    pub fn apply(&mut self, pour_move: Move) -> Result<(), PourError> {
        let Move { from, to, amount } = pour_move;

        if from == to {
            return Err(PourError::SameBottle);
        }

        let source = self.bottles.get(from).ok_or(PourError::OutOfRange(from))?;
        let destination = self.bottles.get(to).ok_or(PourError::OutOfRange(to))?;
        let available = source.height().min(destination.free_space());

        if amount == 0 || amount > available {
            return Err(PourError::InvalidAmount { amount, available });
        }

        self.transfer(pour_move);

        Ok(())
    }

    /// A copy of this state with `pour_move` applied. The move must already be known to fit.
    pub(crate) fn play(&self, pour_move: Move) -> PourState {
        let mut child = self.clone();
        child.transfer(pour_move);
        child
    }

    pub(crate) fn transfer(&mut self, pour_move: Move) {
        let Move { from, to, amount } = pour_move;
        let amount = amount
            .min(self.bottles[from].height())
            .min(self.bottles[to].free_space());

        for _ in 0..amount {
            if let Some(mut slot) = self.bottles[from].pop() {
                slot.hidden = false;
                self.bottles[to].push(slot);
            }
        }

        self.bottles[from].reveal_top();
        self.bottles[to].reveal_top();

        self.refresh_locks();
    }

    pub fn set_gimmick(&mut self, index: usize, gimmick: Gimmick) -> Result<(), PourError> {
        let bottle = self
            .bottles
            .get_mut(index)
            .ok_or(PourError::OutOfRange(index))?;

        *bottle = bottle.clone().with_gimmick(gimmick);
        self.refresh_locks();

        Ok(())
    }

    pub fn set_hidden(&mut self, index: usize, slot: usize, hidden: bool) -> Result<(), PourError> {
        let bottle = self
            .bottles
            .get_mut(index)
            .ok_or(PourError::OutOfRange(index))?;

        if bottle.set_hidden(slot, hidden) {
            Ok(())
        } else {
            Err(PourError::OutOfRange(slot))
        }
    }

    /// Every non-empty bottle is mono-full.
    pub fn is_solved(&self) -> bool {
        self.bottles
            .iter()
            .all(|bottle| bottle.is_empty() || bottle.is_mono_full())
    }

    /// A copy with every hidden flag cleared. Hidden slots never change solvability.
    pub fn revealed(&self) -> PourState {
        let mut revealed = self.clone();

        for bottle in revealed.bottles.iter_mut() {
            bottle.reveal_all();
        }

        revealed
    }

    pub fn total_units(&self) -> usize {
        self.bottles.iter().map(Bottle::height).sum()
    }

    pub fn has_complete_deal(&self) -> bool {
        self.total_units() == self.params.total_units()
    }

    pub fn empty_bottle_count(&self) -> usize {
        self.bottles.iter().filter(|bottle| bottle.is_empty()).count()
    }

    pub fn mono_full_count(&self) -> usize {
        self.bottles
            .iter()
            .filter(|bottle| bottle.is_mono_full())
            .count()
    }

    pub fn hidden_count(&self) -> usize {
        self.bottles.iter().map(Bottle::hidden_count).sum()
    }

    /// Cheap order-sensitive rolling hash over contents, hidden flags and gimmicks.
    /// Not collision free; only used to prune repeated states during search.
    pub fn stable_hash(&self) -> u64 {
        fn mix(hash: u64, value: u64) -> u64 {
            hash ^ value
                .wrapping_add(0x9e37_79b9_7f4a_7c15)
                .wrapping_add(hash << 6)
                .wrapping_add(hash >> 2)
        }

        let mut hash: u64 = 1_469_598_103_934_665_603;

        for bottle in self.bottles.iter() {
            hash = mix(hash, bottle.capacity() as u64);

            for slot in bottle.slots() {
                let flag = if slot.hidden { 0xdead_beef } else { 0x1234_5678 };
                hash = mix(hash, (u64::from(slot.color.get()) << 1) ^ flag);
            }

            let gimmick = bottle.gimmick();
            hash = mix(
                hash,
                u64::from(gimmick.kind_code()) | (u64::from(gimmick.param()) << 8),
            );
        }

        hash
    }
}

impl Display for PourState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (index, bottle) in self.bottles.iter().enumerate() {
            write!(f, "{}", bottle)?;

            if self.locks.is_locked(index) {
                f.write_str(" locked")?;
            }

            f.write_str("\n")?;
        }

        Ok(())
    }
}
