//! Splits DCD configuration lines into positional fields

use crate::error::SyntaxError;

/// Position of a token inside a configuration line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Command = 0,
    Size = 1,
    Address = 2,
    Value = 3,
}

impl Field {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Command),
            1 => Some(Self::Size),
            2 => Some(Self::Address),
            3 => Some(Self::Value),
            _ => None,
        }
    }
}

/// The fields of one configuration line, in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    /// Tokenize a raw line.
    ///
    /// A token starting with `#` ends the line: it and everything after it
    /// are dropped. A `#` inside a token has no special meaning.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let tokens = line
            .split_ascii_whitespace()
            .take_while(|token| !token.starts_with('#'))
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&'a str> {
        self.tokens.get(field as usize).copied()
    }

    pub fn command(&self) -> Option<&'a str> {
        self.get(Field::Command)
    }

    /// Positional fields; tokens past the value position are not yielded
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'a str)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| Field::from_index(i).map(|field| (field, *token)))
    }

    /// Tokens beyond the value position, ignored by the compiler
    pub fn extra(&self) -> &[&'a str] {
        self.tokens.get(4..).unwrap_or(&[])
    }
}

/// Parse a whole token as a base-16 `u32`.
///
/// An optional `0x`/`0X` prefix is accepted. Empty tokens, signs, trailing
/// garbage and values wider than 32 bits are rejected.
pub fn parse_hex(token: &str) -> Result<u32, SyntaxError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SyntaxError::InvalidHex(token.to_string()));
    }

    u32::from_str_radix(digits, 16).map_err(|_| SyntaxError::InvalidHex(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_whitespace_runs() {
        let fields = Fields::parse("DATA   4\t0x30340004  0x4F400005\r\n");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields.command(), Some("DATA"));
        assert_eq!(fields.get(Field::Size), Some("4"));
        assert_eq!(fields.get(Field::Address), Some("0x30340004"));
        assert_eq!(fields.get(Field::Value), Some("0x4F400005"));
    }

    #[test]
    fn test_leading_hash_cuts_the_line() {
        let fields = Fields::parse("DATA 4 0x30340004 # 0x4F400005");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get(Field::Value), None);

        assert!(Fields::parse("# a comment").is_empty());
        assert!(Fields::parse("   #DATA 4 0 0").is_empty());
    }

    #[test]
    fn test_hash_inside_a_token_is_kept() {
        let fields = Fields::parse("DATA 4 a#b 0");
        assert_eq!(fields.get(Field::Address), Some("a#b"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_blank_lines_have_no_fields() {
        assert!(Fields::parse("").is_empty());
        assert!(Fields::parse("\r\n").is_empty());
        assert!(Fields::parse(" \t \n").is_empty());
    }

    #[test]
    fn test_iter_stops_at_value_position() {
        let fields = Fields::parse("DATA 4 10 20 30 40");
        let positions: Vec<Field> = fields.iter().map(|(f, _)| f).collect();
        assert_eq!(
            positions,
            vec![Field::Command, Field::Size, Field::Address, Field::Value]
        );
        assert_eq!(fields.extra(), &["30", "40"]);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("1F"), Ok(0x1F));
        assert_eq!(parse_hex("0x30340004"), Ok(0x3034_0004));
        assert_eq!(parse_hex("0XFFFFFFFF"), Ok(u32::MAX));
        assert_eq!(parse_hex("00000000000000ff"), Ok(0xFF));
    }

    #[test]
    fn test_parse_hex_rejects_partial_tokens() {
        for bad in ["", "0x", "12zz", "+12", "-1", "0x1_0", "100000000", "sd"] {
            assert_eq!(
                parse_hex(bad),
                Err(SyntaxError::InvalidHex(bad.to_string())),
                "{bad:?}"
            );
        }
    }
}
