use crate::record::{PuzzleRow, HEADER};
use log::warn;
use pest::{iterators::Pair, Parser};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[grammar = "record_parser/grammar.pest"]
struct RecordParser;

pub struct RecordCollection {
    /// Every non-empty data row, valid or not.
    pub total_rows: u32,
    pub valid_rows: Vec<PuzzleRow>,
}

impl RecordCollection {
    pub fn new() -> RecordCollection {
        RecordCollection {
            total_rows: 0,
            valid_rows: Vec::new(),
        }
    }

    pub fn append(&mut self, mut other: RecordCollection) {
        self.total_rows += other.total_rows;
        self.valid_rows.append(&mut other.valid_rows);
    }

    pub fn next_index(&self) -> usize {
        self.valid_rows
            .iter()
            .map(|row| row.index + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Default for RecordCollection {
    fn default() -> Self {
        RecordCollection::new()
    }
}

fn read_fields(pair: Pair<Rule>) -> Vec<&str> {
    pair.into_inner()
        .filter(|inner| inner.as_rule() == Rule::field)
        .map(|field| field.as_str())
        .collect()
}

fn is_header(fields: &[&str]) -> bool {
    fields.first().map(|field| field.trim()) == HEADER.split(',').next()
}

/// Parses a record file. Malformed rows are counted and skipped.
pub fn parse(contents: &str) -> Result<RecordCollection, Box<dyn Error>> {
    let top_pair = RecordParser::parse(Rule::file, contents)?
        .next()
        .ok_or("empty parse")?;

    let mut collection = RecordCollection::new();

    for (line, pair) in top_pair
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::row)
        .enumerate()
    {
        let fields = read_fields(pair);

        if fields.iter().all(|field| field.trim().is_empty()) || is_header(&fields) {
            continue;
        }

        collection.total_rows += 1;

        match PuzzleRow::from_fields(&fields).and_then(|row| row.decode().map(|_| row)) {
            Ok(row) => collection.valid_rows.push(row),
            Err(error) => warn!("skipping row {}: {}", line + 1, error),
        }
    }

    Ok(collection)
}

pub fn load(path: &Path) -> Result<RecordCollection, Box<dyn Error>> {
    parse(&fs::read_to_string(path)?)
}
