// Classify raw cell text into typed values

use super::lexer::{fixed_digits, ws};
use crate::value::CellValue;
use chrono::{NaiveDate, NaiveDateTime};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value},
    number::complete::recognize_float,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// Text that spreadsheet readers treat as a missing value.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_marker(raw: &str) -> bool {
    NA_MARKERS.contains(&raw.trim())
}

/// Parse one cell of text into a typed value.
///
/// Missing markers become `Null`; integers, floats, booleans and ISO dates
/// (`2024-01-31`, `2024-01-31 08:00`, `2024-01-31T08:00:00.5`) are typed;
/// anything else is kept verbatim as text.
pub fn parse_cell(raw: &str) -> CellValue {
    if is_na_marker(raw) {
        return CellValue::Null;
    }

    let typed = alt((
        all_consuming(ws(map(timestamp, CellValue::Timestamp))),
        all_consuming(ws(map(integer, CellValue::Integer))),
        all_consuming(ws(map(float, CellValue::Float))),
        all_consuming(ws(map(boolean, CellValue::Bool))),
    ))(raw);

    match typed {
        Ok((_, v)) => v,
        Err(_) => CellValue::Text(raw.to_string()),
    }
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn float(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, |s: &str| s.parse::<f64>())(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, tag_no_case("true")),
        value(false, tag_no_case("false")),
    ))(input)
}

/// Format: YYYY-MM-DD with an optional `T` or space separated HH:MM[:SS[.fff]]
fn timestamp(input: &str) -> IResult<&str, NaiveDateTime> {
    let date = map_opt(
        tuple((fixed_digits(4), char('-'), fixed_digits(2), char('-'), fixed_digits(2))),
        |(y, _, m, _, d)| NaiveDate::from_ymd_opt(y as i32, m, d),
    );

    map_opt(
        pair(date, opt(preceded(one_of("T "), time_of_day))),
        |(date, time)| {
            let (h, m, s, nanos) = time.unwrap_or((0, 0, 0, 0));
            date.and_hms_nano_opt(h, m, s, nanos)
        },
    )(input)
}

fn time_of_day(input: &str) -> IResult<&str, (u32, u32, u32, u32)> {
    map(
        tuple((
            fixed_digits(2),
            char(':'),
            fixed_digits(2),
            opt(preceded(char(':'), fixed_digits(2))),
            opt(preceded(char('.'), digit1)),
        )),
        |(h, _, m, s, frac)| (h, m, s.unwrap_or(0), frac.map(fraction_to_nanos).unwrap_or(0)),
    )(input)
}

fn fraction_to_nanos(digits: &str) -> u32 {
    let mut padded: String = digits.chars().take(9).collect();
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse::<u32>().unwrap_or(0)
}
