//! Moment-style date patterns for note file names.
//!
//! Note names are produced and ordered with patterns such as
//! `YYYY-MM-DD \at HHːmm`. The pattern is compiled once into a chrono
//! strftime string which is then used for both formatting and parsing.

use crate::{Result, SequencerError};
use chrono::format::{parse_and_remainder, Item, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use std::fmt;

/// A compiled moment-style date pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
}

impl DateFormat {
    /// Compile a moment-style pattern.
    ///
    /// Supported tokens: `YYYY YY M MM MMM MMMM D DD DDD DDDD d dd ddd dddd
    /// H HH h hh m mm s ss A a`. A backslash escapes the next character and
    /// `[...]` is a literal block. Other moment tokens (`Do`, `Q`, `X`, `S`,
    /// `Z` and friends) are rejected; remaining characters are literal.
    pub fn new(pattern: &str) -> Result<Self> {
        let strftime = translate(pattern)?;

        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(SequencerError::InvalidDateFormat {
                pattern: pattern.to_string(),
                reason: format!("translated to unusable chrono format '{}'", strftime),
            });
        }

        Ok(Self {
            pattern: pattern.to_string(),
            strftime,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The chrono strftime string this pattern compiles to
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    pub fn format(&self, instant: &NaiveDateTime) -> String {
        instant.format(&self.strftime).to_string()
    }

    /// Parse a leading timestamp out of `name`.
    ///
    /// Trailing text after the timestamp (a `.md` extension, a title) is
    /// ignored. Patterns without time fields resolve to midnight; a pattern
    /// with an hour but no minute resolves to the top of the hour, and a
    /// 12-hour clock without a meridiem reads as AM. Returns `None` when the
    /// name does not match.
    pub fn parse(&self, name: &str) -> Option<NaiveDateTime> {
        let mut parsed = Parsed::new();
        parse_and_remainder(&mut parsed, name, StrftimeItems::new(&self.strftime)).ok()?;

        let date = parsed.to_naive_date().ok()?;
        if parsed.hour_mod_12.is_none() {
            return Some(date.and_time(NaiveTime::MIN));
        }
        if parsed.hour_div_12.is_none() {
            parsed.set_ampm(false).ok()?;
        }
        if parsed.minute.is_none() {
            parsed.set_minute(0).ok()?;
        }

        Some(date.and_time(parsed.to_naive_time().ok()?))
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Moment token letters with no chrono counterpart here. Ordinals (`Do`)
/// are caught after the token they follow.
const UNSUPPORTED_TOKENS: &str = "QXxSZWwEeGgkN";

fn translate(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut out, escaped),
                None => {
                    return Err(SequencerError::InvalidDateFormat {
                        pattern: pattern.to_string(),
                        reason: "dangling escape at end of pattern".to_string(),
                    });
                }
            },
            '[' => {
                let mut closed = false;
                for literal in chars.by_ref() {
                    if literal == ']' {
                        closed = true;
                        break;
                    }
                    push_literal(&mut out, literal);
                }
                if !closed {
                    return Err(SequencerError::InvalidDateFormat {
                        pattern: pattern.to_string(),
                        reason: "unterminated '[' literal block".to_string(),
                    });
                }
            }
            'Y' | 'M' | 'D' | 'd' | 'H' | 'h' | 'm' | 's' => {
                let mut run = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    run += 1;
                }
                if matches!(c, 'M' | 'D' | 'd') && chars.peek() == Some(&'o') {
                    return Err(unsupported(pattern, &format!("{}o", c.to_string().repeat(run))));
                }
                out.push_str(token(c, run));
            }
            'A' => out.push_str("%p"),
            'a' => out.push_str("%P"),
            other if UNSUPPORTED_TOKENS.contains(other) => {
                return Err(unsupported(pattern, &other.to_string()));
            }
            other => push_literal(&mut out, other),
        }
    }

    Ok(out)
}

fn unsupported(pattern: &str, token: &str) -> SequencerError {
    SequencerError::InvalidDateFormat {
        pattern: pattern.to_string(),
        reason: format!("unsupported token '{}', escape it to use it literally", token),
    }
}

fn token(letter: char, run: usize) -> &'static str {
    match (letter, run) {
        ('Y', 2) => "%y",
        ('Y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('D', 1) => "%-d",
        ('D', 2) => "%d",
        ('D', 3) => "%-j",
        ('D', _) => "%j",
        ('d', 1) => "%w",
        ('d', 2) | ('d', 3) => "%a",
        ('d', _) => "%A",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        _ => "%S",
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
