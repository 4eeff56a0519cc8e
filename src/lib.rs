#[macro_use]
extern crate pest_derive;

pub mod difficulty;
pub mod generation;
pub mod pour;
pub mod record;
pub mod record_parser;
pub mod solver;
