//! Reference-number selection syntax.
//!
//! A selection is a comma- or whitespace-separated list of reference
//! numbers and inclusive ranges, e.g. `4, 9 21-24`. The keyword `all`
//! expands to every position in the library.

use crate::{error::Result, Error, Position};

/// Resolve selection text against a library of `len` records.
///
/// Positions come back in the order they were written, duplicates
/// included. Callers that need a particular order (deletion goes from
/// highest to lowest) or uniqueness apply it themselves.
pub fn resolve(text: &str, len: usize) -> Result<Vec<Position>> {
    let mut positions = Vec::new();

    for token in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if token.eq_ignore_ascii_case("all") {
            positions.extend(1..=len);
            continue;
        }

        match token.split_once('-') {
            Some((lo, hi)) => {
                let lo = parse_position(lo, token)?;
                let hi = parse_position(hi, token)?;
                if lo > hi {
                    return Err(Error::InvertedRange { lo, hi });
                }
                check_bounds(lo, len)?;
                check_bounds(hi, len)?;
                positions.extend(lo..=hi);
            }
            None => {
                let position = parse_position(token, token)?;
                check_bounds(position, len)?;
                positions.push(position);
            }
        }
    }

    if positions.is_empty() {
        return Err(Error::EmptySelection);
    }
    Ok(positions)
}

/// Resolve command-line arguments, treating each as part of one selection.
pub fn resolve_args<S: AsRef<str>>(args: &[S], len: usize) -> Result<Vec<Position>> {
    let joined: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    resolve(&joined.join(","), len)
}

/// Plain ASCII digits only; `parse` alone would also take `+3`.
fn parse_position(part: &str, token: &str) -> Result<Position> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidToken(token.to_string()));
    }
    part.parse::<Position>()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn check_bounds(position: Position, len: usize) -> Result<()> {
    if position == 0 || position > len {
        return Err(Error::PositionOutOfRange { position, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_numbers_and_ranges() {
        assert_eq!(resolve("4, 9, 21-24", 30).unwrap(), vec![4, 9, 21, 22, 23, 24]);
        assert_eq!(resolve("41-43", 50).unwrap(), vec![41, 42, 43]);
        assert_eq!(resolve("3 1 2", 3).unwrap(), vec![3, 1, 2]);
        assert_eq!(resolve("5-5", 5).unwrap(), vec![5]);
    }

    #[test]
    fn all_keyword() {
        assert_eq!(resolve("all", 4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(resolve("ALL", 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn keeps_duplicates_and_order() {
        assert_eq!(resolve("2,1,2", 3).unwrap(), vec![2, 1, 2]);
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(resolve("", 10), Err(Error::EmptySelection));
        assert_eq!(resolve(" , ,", 10), Err(Error::EmptySelection));
        assert_eq!(resolve("all", 0), Err(Error::EmptySelection));
    }

    #[test]
    fn non_numeric_fails() {
        assert_eq!(resolve("1, x", 10), Err(Error::InvalidToken("x".into())));
        assert_eq!(resolve("-3", 10), Err(Error::InvalidToken("-3".into())));
        assert_eq!(resolve("2-", 10), Err(Error::InvalidToken("2-".into())));
        assert_eq!(resolve("1.5", 10), Err(Error::InvalidToken("1.5".into())));
    }

    #[test]
    fn signs_are_not_digits() {
        assert_eq!(resolve("+3", 10), Err(Error::InvalidToken("+3".into())));
        assert_eq!(resolve("1-+4", 10), Err(Error::InvalidToken("1-+4".into())));
        assert_eq!(
            resolve("99999999999999999999999", 10),
            Err(Error::InvalidToken("99999999999999999999999".into()))
        );
    }

    #[test]
    fn inverted_range_fails() {
        assert_eq!(resolve("9-3", 10), Err(Error::InvertedRange { lo: 9, hi: 3 }));
    }

    #[test]
    fn out_of_range_fails() {
        assert_eq!(
            resolve("0", 10),
            Err(Error::PositionOutOfRange { position: 0, len: 10 })
        );
        assert_eq!(
            resolve("8-11", 10),
            Err(Error::PositionOutOfRange { position: 11, len: 10 })
        );
    }

    #[test]
    fn args_are_joined() {
        let args = vec!["1".to_string(), "3-4".to_string()];
        assert_eq!(resolve_args(&args, 5).unwrap(), vec![1, 3, 4]);
    }
}
