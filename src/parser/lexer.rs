// Shared lexing combinators

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::multispace0,
    combinator::map_res,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so surrounding whitespace is ignored.
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Exactly `n` ASCII digits as a number (e.g. the `2024` of a date).
pub fn fixed_digits<'a>(n: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u32> {
    map_res(
        take_while_m_n(n, n, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u32>(),
    )
}
