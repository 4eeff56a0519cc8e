use super::{Color, Gimmick};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub color: Color,
    /// Concealed from the player until the slot becomes the top of its bottle.
    pub hidden: bool,
}

impl Slot {
    pub fn new(color: Color) -> Slot {
        Slot {
            color,
            hidden: false,
        }
    }

    pub fn hidden(color: Color) -> Slot {
        Slot {
            color,
            hidden: true,
        }
    }
}

/// A capacity-limited stack of colour units, stored bottom to top.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bottle {
    slots: Vec<Slot>,
    capacity: usize,
    gimmick: Gimmick,
}

impl Bottle {
    pub fn new(capacity: usize) -> Bottle {
        Bottle {
            slots: Vec::with_capacity(capacity),
            capacity,
            gimmick: Gimmick::None,
        }
    }

    pub fn with_slots(capacity: usize, mut slots: Vec<Slot>) -> Bottle {
        slots.truncate(capacity);

        Bottle {
            slots,
            capacity,
            gimmick: Gimmick::None,
        }
    }

    pub fn with_gimmick(mut self, gimmick: Gimmick) -> Bottle {
        self.gimmick = gimmick;
        self
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn height(&self) -> usize {
        self.slots.len()
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.slots.len()
    }

    pub fn gimmick(&self) -> Gimmick {
        self.gimmick
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn top(&self) -> Option<&Slot> {
        self.slots.last()
    }

    pub fn top_color(&self) -> Option<Color> {
        self.top().map(|slot| slot.color)
    }

    /// The number of contiguous same-colour, visible units at the top.
    /// A hidden top yields zero.
    pub fn top_chunk(&self) -> usize {
        let top_color = match self.top() {
            Some(slot) if !slot.hidden => slot.color,
            _ => return 0,
        };

        self.slots
            .iter()
            .rev()
            .take_while(|slot| !slot.hidden && slot.color == top_color)
            .count()
    }

    /// Same-colour run at the top, ignoring visibility.
    pub fn run_length(&self, color: Color) -> usize {
        self.slots
            .iter()
            .rev()
            .take_while(|slot| slot.color == color)
            .count()
    }

    pub fn is_mono_full(&self) -> bool {
        match self.slots.first() {
            Some(first) => {
                self.slots.len() == self.capacity
                    && self.slots.iter().all(|slot| slot.color == first.color)
            }
            None => false,
        }
    }

    /// Maximal same-colour runs, bottom to top.
    pub fn color_groups(&self) -> usize {
        let mut groups = 0;
        let mut previous = None;

        for slot in self.slots.iter() {
            if previous != Some(slot.color) {
                groups += 1;
                previous = Some(slot.color);
            }
        }

        groups
    }

    pub fn hidden_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.hidden).count()
    }

    pub fn count_of(&self, color: Color) -> usize {
        self.slots.iter().filter(|slot| slot.color == color).count()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.slots.iter().any(|slot| slot.color == color)
    }

    pub(crate) fn push(&mut self, slot: Slot) -> bool {
        if self.is_full() {
            return false;
        }

        self.slots.push(slot);
        true
    }

    pub(crate) fn pop(&mut self) -> Option<Slot> {
        self.slots.pop()
    }

    pub(crate) fn set_color(&mut self, index: usize, color: Color) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.color = color;
        }
    }

    pub(crate) fn set_hidden(&mut self, index: usize, hidden: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub(crate) fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    pub(crate) fn reveal_top(&mut self) {
        if let Some(slot) = self.slots.last_mut() {
            slot.hidden = false;
        }
    }

    pub(crate) fn reveal_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.hidden = false;
        }
    }
}

impl Display for Bottle {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let cells: Vec<String> = (0..self.capacity)
            .map(|index| match self.slots.get(index) {
                Some(Slot {
                    color,
                    hidden: true,
                }) => format!("?{}", color),
                Some(Slot { color, .. }) => format!("{}", color),
                None => String::from("."),
            })
            .collect();

        write!(f, "|{}|", cells.join(" "))?;

        if !self.gimmick.is_none() {
            write!(f, " {}", self.gimmick)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn top_chunk_counts_matching_run() {
        assert_eq!(bottle(4, &[1, 2, 2, 2]).top_chunk(), 3);
        assert_eq!(bottle(4, &[2, 1, 2]).top_chunk(), 1);
        assert_eq!(bottle(4, &[]).top_chunk(), 0);
    }

    #[test]
    fn hidden_top_blocks_chunk() {
        let bottle = Bottle::with_slots(3, vec![Slot::new(color(1)), Slot::hidden(color(1))]);

        assert_eq!(bottle.top_chunk(), 0);
    }

    #[test]
    fn hidden_slot_ends_chunk() {
        let bottle = Bottle::with_slots(
            3,
            vec![Slot::hidden(color(1)), Slot::new(color(1)), Slot::new(color(1))],
        );

        assert_eq!(bottle.top_chunk(), 2);
        assert_eq!(bottle.run_length(color(1)), 3);
    }

    #[test]
    fn mono_full_requires_full_single_colour() {
        assert!(bottle(3, &[2, 2, 2]).is_mono_full());
        assert!(!bottle(3, &[2, 2]).is_mono_full());
        assert!(!bottle(3, &[2, 1, 2]).is_mono_full());
        assert!(!bottle(3, &[]).is_mono_full());
    }

    #[test]
    fn colour_groups_are_maximal_runs() {
        assert_eq!(bottle(5, &[1, 1, 2, 1, 1]).color_groups(), 3);
        assert_eq!(bottle(5, &[3]).color_groups(), 1);
        assert_eq!(bottle(5, &[]).color_groups(), 0);
    }

    #[test]
    fn slots_beyond_capacity_are_dropped() {
        assert_eq!(bottle(2, &[1, 2, 3]).height(), 2);
    }

    #[test]
    fn display() {
        let bottle = Bottle::with_slots(4, vec![Slot::hidden(color(3)), Slot::new(color(1))])
            .with_gimmick(Gimmick::Cloth(color(2)));

        assert_eq!(format!("{}", bottle), "|?3 1 . .| cloth:2");
    }
}
