// Cell text parser for spreadsheet and CSV input

pub mod cell;
pub mod lexer;

pub use cell::{is_na_marker, parse_cell};
