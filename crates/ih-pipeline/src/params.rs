//! Token helpers shared by the built-in actions.
//!
//! A directive is `name,token,token,...`. Tokens equal to the action name or
//! empty are ignored; the rest are either `key_value` pairs or bare values.

use ih_core::{Error, Result};

/// Tokens that carry parameters, in order.
pub fn tokens<'a>(name: &'a str, params: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    params
        .iter()
        .copied()
        .filter(move |t| !t.is_empty() && *t != name)
}

/// Split a `key_value` token at the first `_`. A token without `_` is a key
/// with an empty value.
pub fn split_kv(token: &str) -> (&str, &str) {
    token.split_once('_').unwrap_or((token, ""))
}

pub fn unknown_param(key: &str) -> Error {
    Error::invalid(format!("Unknown param: \"{key}\""))
}

/// Parse `value` as an integer in `lo..=hi`.
///
/// Anything else, including non-numeric input, fails with
/// `"<field> must be between <lo> and <hi>"`.
pub fn int_in_range(field: &str, value: &str, lo: i64, hi: i64) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| (lo..=hi).contains(v))
        .ok_or_else(|| Error::invalid(format!("{field} must be between {lo} and {hi}")))
}

/// [`int_in_range`] narrowed to `u32` for non-negative ranges.
pub fn u32_in_range(field: &str, value: &str, lo: u32, hi: u32) -> Result<u32> {
    int_in_range(field, value, i64::from(lo), i64::from(hi)).map(|v| v as u32)
}

/// The single bare value of actions like `rotate,90`.
pub fn single_value<'a>(name: &'a str, params: &'a [&'a str]) -> Result<&'a str> {
    let mut iter = tokens(name, params);
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        (None, _) => Err(Error::invalid(format!("{name} requires a value"))),
        (Some(_), Some(extra)) => Err(Error::invalid(format!(
            "{name} takes a single value, got extra \"{extra}\""
        ))),
    }
}

/// Anchor for placing a region inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    pub fn parse(value: &str) -> Result<Self> {
        Ok(match value {
            "nw" => Self::NorthWest,
            "north" => Self::North,
            "ne" => Self::NorthEast,
            "west" => Self::West,
            "center" => Self::Center,
            "east" => Self::East,
            "sw" => Self::SouthWest,
            "south" => Self::South,
            "se" => Self::SouthEast,
            other => return Err(Error::invalid(format!("Unknown gravity: \"{other}\""))),
        })
    }

    /// Top-left corner of an `inner` box placed in `outer`, with offsets
    /// measured inward from the anchored edge. Centred axes add the offset.
    pub fn origin(self, outer: (u32, u32), inner: (u32, u32), offset: (u32, u32)) -> (i64, i64) {
        let place = |outer: u32, inner: u32, offset: u32, side: Side| -> i64 {
            let (outer, inner, offset) = (i64::from(outer), i64::from(inner), i64::from(offset));
            match side {
                Side::Start => offset,
                Side::Middle => (outer - inner) / 2 + offset,
                Side::End => outer - inner - offset,
            }
        };
        let (h, v) = self.sides();
        (
            place(outer.0, inner.0, offset.0, h),
            place(outer.1, inner.1, offset.1, v),
        )
    }

    fn sides(self) -> (Side, Side) {
        use Side::*;
        match self {
            Self::NorthWest => (Start, Start),
            Self::North => (Middle, Start),
            Self::NorthEast => (End, Start),
            Self::West => (Start, Middle),
            Self::Center => (Middle, Middle),
            Self::East => (End, Middle),
            Self::SouthWest => (Start, End),
            Self::South => (Middle, End),
            Self::SouthEast => (End, End),
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Start,
    Middle,
    End,
}

/// Parse a `RRGGBB` hex colour.
pub fn hex_color(value: &str) -> Result<[u8; 3]> {
    let bad = || Error::invalid(format!("Color must be RRGGBB hex, got \"{value}\""));
    if value.len() != 6 || !value.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&value[i..i + 2], 16).map_err(|_| bad());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_skip_name_and_empty() {
        let params = ["quality", "", "q_50", "quality", "Q_1"];
        let got: Vec<_> = tokens("quality", &params).collect();
        assert_eq!(got, ["q_50", "Q_1"]);
    }

    #[test]
    fn split_at_first_underscore() {
        assert_eq!(split_kv("image_aGVsbG9fd29ybGQ"), ("image", "aGVsbG9fd29ybGQ"));
        assert_eq!(split_kv("q_-1"), ("q", "-1"));
        assert_eq!(split_kv("w_1_2"), ("w", "1_2"));
        assert_eq!(split_kv("q"), ("q", ""));
    }

    #[test]
    fn range_errors() {
        assert_eq!(int_in_range("Quality", "50", 1, 100).unwrap(), 50);
        for bad in ["0", "-1", "101", "1111", "abc", ""] {
            let err = int_in_range("Quality", bad, 1, 100).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid argument: Quality must be between 1 and 100",
                "{bad}"
            );
        }
    }

    #[test]
    fn single_value_counts() {
        assert_eq!(single_value("rotate", &["rotate", "90"]).unwrap(), "90");
        assert!(single_value("rotate", &["rotate"]).is_err());
        assert!(single_value("rotate", &["rotate", "90", "180"]).is_err());
    }

    #[test]
    fn gravity_origin() {
        let outer = (100, 50);
        let inner = (20, 10);
        assert_eq!(Gravity::NorthWest.origin(outer, inner, (5, 5)), (5, 5));
        assert_eq!(Gravity::Center.origin(outer, inner, (0, 0)), (40, 20));
        assert_eq!(Gravity::SouthEast.origin(outer, inner, (10, 10)), (70, 30));
        assert_eq!(Gravity::North.origin(outer, inner, (0, 3)), (40, 3));
        assert!(Gravity::parse("up").is_err());
    }

    #[test]
    fn colors() {
        assert_eq!(hex_color("FF8000").unwrap(), [255, 128, 0]);
        assert!(hex_color("FFF").is_err());
        assert!(hex_color("GG0000").is_err());
    }
}
