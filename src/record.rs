use crate::difficulty::{Difficulty, DifficultyLabel, UnknownLabel};
use crate::generation::GeneratedPuzzle;
use crate::pour::{Bottle, Color, Gimmick, Params, PourState, Slot};
use std::convert::TryFrom;
use std::io;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

pub const HEADER: &str = "index,map,slot_gimmick,stack_gimmick,NumberOfItem,NumberOfSlot,NumberOfStack,MixCount,MinMoves,DifficultyScore,DifficultyLabel";

pub const FIELD_COUNT: usize = 11;

const BOTTLE_SEPARATOR: char = '#';
const CELL_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("expected 11 fields, found {0}")]
    FieldCount(usize),
    #[error("field `{field}` is not a number: `{value}`")]
    Number { field: &'static str, value: String },
    #[error(transparent)]
    Label(#[from] UnknownLabel),
    #[error("`{field}` describes {found} bottles, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("colour {color} in bottle {bottle} is outside the palette of {colors}")]
    ColorOutOfRange {
        bottle: usize,
        color: usize,
        colors: usize,
    },
    #[error("unknown gimmick `{0}`")]
    UnknownGimmick(String),
    #[error("malformed bottle `{0}`")]
    Malformed(String),
}

/// One persisted puzzle. Locks are never stored, `decode` derives them.
#[derive(Clone, Debug, PartialEq)]
pub struct PuzzleRow {
    pub index: usize,
    pub map: String,
    pub slot_gimmick: String,
    pub stack_gimmick: String,
    pub colors: usize,
    pub capacity: usize,
    pub bottles: usize,
    pub mix_intensity: usize,
    pub min_moves: u32,
    pub difficulty_score: f64,
    pub difficulty_label: DifficultyLabel,
}

impl PuzzleRow {
    pub fn from_state(
        index: usize,
        state: &PourState,
        mix_intensity: usize,
        min_moves: u32,
        difficulty: &Difficulty,
    ) -> PuzzleRow {
        let params = state.params();

        PuzzleRow {
            index,
            map: encode_map(state),
            slot_gimmick: encode_slot_gimmick(state),
            stack_gimmick: encode_stack_gimmick(state),
            colors: params.num_colors,
            capacity: params.capacity,
            bottles: params.num_bottles,
            mix_intensity,
            min_moves,
            difficulty_score: difficulty.score,
            difficulty_label: difficulty.label,
        }
    }

    pub fn from_puzzle(index: usize, puzzle: &GeneratedPuzzle) -> PuzzleRow {
        PuzzleRow::from_state(
            index,
            &puzzle.state,
            puzzle.mix_intensity,
            puzzle.min_moves,
            &puzzle.difficulty,
        )
    }

    pub fn from_fields(fields: &[&str]) -> Result<PuzzleRow, RecordError> {
        if fields.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount(fields.len()));
        }

        Ok(PuzzleRow {
            index: number("index", fields[0])?,
            map: fields[1].trim().to_owned(),
            slot_gimmick: fields[2].trim().to_owned(),
            stack_gimmick: fields[3].trim().to_owned(),
            colors: number("NumberOfItem", fields[4])?,
            capacity: number("NumberOfSlot", fields[5])?,
            bottles: number("NumberOfStack", fields[6])?,
            mix_intensity: number("MixCount", fields[7])?,
            min_moves: number("MinMoves", fields[8])?,
            difficulty_score: number("DifficultyScore", fields[9])?,
            difficulty_label: fields[10].parse()?,
        })
    }

    pub fn params(&self) -> Params {
        Params::new(self.colors, self.bottles, self.capacity)
    }

    /// Rebuilds the start state and derives its locks.
    pub fn decode(&self) -> Result<PourState, RecordError> {
        let params = self.params();

        let contents = split_bottles("map", &self.map, params.num_bottles)?;
        let masks = split_bottles("slot_gimmick", &self.slot_gimmick, params.num_bottles)?;
        let gimmicks = split_bottles("stack_gimmick", &self.stack_gimmick, params.num_bottles)?;

        let mut bottles = Vec::with_capacity(params.num_bottles);

        for (index, ((cells, mask), gimmick)) in contents
            .iter()
            .zip(masks.iter())
            .zip(gimmicks.iter())
            .enumerate()
        {
            let mut slots = Vec::with_capacity(params.capacity);

            for color in decode_cells(cells, params.capacity)? {
                if color == 0 {
                    continue;
                }
                if color > params.num_colors {
                    return Err(RecordError::ColorOutOfRange {
                        bottle: index,
                        color,
                        colors: params.num_colors,
                    });
                }
                if slots.len() == params.capacity {
                    return Err(RecordError::Malformed((*cells).to_owned()));
                }

                let color = u8::try_from(color)
                    .ok()
                    .and_then(Color::new)
                    .ok_or(RecordError::ColorOutOfRange {
                        bottle: index,
                        color,
                        colors: params.num_colors,
                    })?;
                slots.push(Slot::new(color));
            }

            for (slot, flag) in slots.iter_mut().zip(mask.chars()) {
                slot.hidden = flag == '1';
            }

            let gimmick = decode_gimmick(gimmick)?;
            bottles.push(Bottle::with_slots(params.capacity, slots).with_gimmick(gimmick));
        }

        Ok(PourState::new(params, bottles))
    }

    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{:.2},{}",
            self.index,
            self.map,
            self.slot_gimmick,
            self.stack_gimmick,
            self.colors,
            self.capacity,
            self.bottles,
            self.mix_intensity,
            self.min_moves,
            self.difficulty_score,
            self.difficulty_label
        )
    }
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, RecordError> {
    value.trim().parse().map_err(|_| RecordError::Number {
        field,
        value: value.to_owned(),
    })
}

fn split_bottles<'a>(
    field: &'static str,
    value: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, RecordError> {
    let parts: Vec<&str> = value.split(BOTTLE_SEPARATOR).collect();

    if parts.len() != expected {
        return Err(RecordError::ShapeMismatch {
            field,
            found: parts.len(),
            expected,
        });
    }

    Ok(parts)
}

/// Reads `_`-separated cells, or one digit per slot when a separator-free
/// string spans the whole capacity.
fn decode_cells(cells: &str, capacity: usize) -> Result<Vec<usize>, RecordError> {
    let malformed = || RecordError::Malformed(cells.to_owned());

    if cells.is_empty() {
        Ok(Vec::new())
    } else if cells.contains(CELL_SEPARATOR) {
        cells
            .split(CELL_SEPARATOR)
            .map(|cell| cell.parse::<usize>().map_err(|_| malformed()))
            .collect()
    } else if capacity > 1 && cells.chars().count() == capacity {
        cells
            .chars()
            .map(|cell| {
                cell.to_digit(10)
                    .map(|digit| digit as usize)
                    .ok_or_else(malformed)
            })
            .collect()
    } else {
        cells
            .parse::<usize>()
            .map(|cell| vec![cell])
            .map_err(|_| malformed())
    }
}

fn decode_gimmick(value: &str) -> Result<Gimmick, RecordError> {
    let unknown = || RecordError::UnknownGimmick(value.to_owned());
    let mut parts = value.splitn(2, CELL_SEPARATOR);

    let kind = parts
        .next()
        .and_then(|kind| kind.parse().ok())
        .ok_or_else(unknown)?;
    let param = parts
        .next()
        .and_then(|param| param.parse().ok())
        .ok_or_else(unknown)?;

    Gimmick::from_code(kind, param).ok_or_else(unknown)
}

fn join_bottles<F>(state: &PourState, encode: F) -> String
where
    F: Fn(&Bottle) -> String,
{
    state
        .bottles()
        .iter()
        .map(encode)
        .collect::<Vec<_>>()
        .join(&BOTTLE_SEPARATOR.to_string())
}

/// Bottom-to-top colours, zero padded to capacity.
pub fn encode_map(state: &PourState) -> String {
    join_bottles(state, |bottle| {
        (0..bottle.capacity())
            .map(|index| match bottle.slots().get(index) {
                Some(slot) => slot.color.to_string(),
                None => String::from("0"),
            })
            .collect::<Vec<_>>()
            .join(&CELL_SEPARATOR.to_string())
    })
}

/// One `0`/`1` hidden flag per slot position.
pub fn encode_slot_gimmick(state: &PourState) -> String {
    join_bottles(state, |bottle| {
        (0..bottle.capacity())
            .map(|index| match bottle.slots().get(index) {
                Some(slot) if slot.hidden => '1',
                _ => '0',
            })
            .collect()
    })
}

/// `kind_param` per bottle.
pub fn encode_stack_gimmick(state: &PourState) -> String {
    join_bottles(state, |bottle| {
        let gimmick = bottle.gimmick();
        format!("{}{}{}", gimmick.kind_code(), CELL_SEPARATOR, gimmick.param())
    })
}

pub fn write_rows<W: Write>(writer: &mut W, rows: &[PuzzleRow], header: bool) -> io::Result<()> {
    if header {
        writeln!(writer, "{}", HEADER)?;
    }

    for row in rows {
        writeln!(writer, "{}", row.to_line())?;
    }

    Ok(())
}
