//! Lexical analysis of location patterns.

use std::fmt;

/// Letters that denote a location field, including the deprecated `L`, `l`, and `H`.
const FIELD_LETTERS: &[char] = &['D', 'M', 'S', 'd', 'm', 's', 'E', 'L', 'l', 'H'];

/// A run of one field letter, with an optional fraction (`DD.DDD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRun {
    pub letter: char,
    /// Number of letters before the `.`.
    pub width: usize,
    /// Number of letters after the `.`, if there is one.
    pub fraction: Option<usize>,
}

/// One lexical element of a location pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text without special meaning, either quoted or unquoted.
    Literal(String),
    Field(FieldRun),
    /// `+`
    Sign,
    /// `X` or `x`
    Hemisphere(char),
    /// `'`
    Quote,
    /// `[`
    OptionalStart,
    /// `]`
    OptionalEnd,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => f.write_str(text),
            Token::Field(FieldRun {
                letter,
                width,
                fraction,
            }) => {
                for _ in 0..*width {
                    write!(f, "{letter}")?;
                }
                if let Some(fraction) = fraction {
                    f.write_str(".")?;
                    for _ in 0..*fraction {
                        write!(f, "{letter}")?;
                    }
                }
                Ok(())
            }
            Token::Sign => f.write_str("+"),
            Token::Hemisphere(letter) => write!(f, "{letter}"),
            Token::Quote => f.write_str("'"),
            Token::OptionalStart => f.write_str("["),
            Token::OptionalEnd => f.write_str("]"),
        }
    }
}

fn flush(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

pub(crate) fn is_field_letter(c: char) -> bool {
    FIELD_LETTERS.contains(&c)
}

/// Splits a location pattern into its tokens.
///
/// Tokenization never fails; whether the tokens form a valid pattern is decided when compiling
/// them into a [`LocationFormatter`](super::LocationFormatter).
///
/// ```
/// use track_geodesy::format::tokenize;
///
/// let tokens: Vec<String> = tokenize("+DD.DD[SSS]'XXX'")
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(tokens, ["+", "DD.DD", "[", "SSS", "]", "'", "XXX", "'"]);
/// ```
#[must_use]
pub fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut quoted = false;

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            flush(&mut literal, &mut tokens);
            tokens.push(Token::Quote);
            quoted = !quoted;
            continue;
        }
        if quoted {
            literal.push(c);
            continue;
        }

        let token = match c {
            '+' => Token::Sign,
            '[' => Token::OptionalStart,
            ']' => Token::OptionalEnd,
            'X' | 'x' => Token::Hemisphere(c),
            c if is_field_letter(c) => {
                let mut width = 1;
                while chars.next_if_eq(&c).is_some() {
                    width += 1;
                }

                // a fraction only follows if the `.` is followed by the same letter
                let mut ahead = chars.clone();
                let fraction = if ahead.next() == Some('.') && ahead.next() == Some(c) {
                    chars.next();
                    let mut fraction = 0;
                    while chars.next_if_eq(&c).is_some() {
                        fraction += 1;
                    }
                    Some(fraction)
                } else {
                    None
                };

                Token::Field(FieldRun {
                    letter: c,
                    width,
                    fraction,
                })
            }
            _ => {
                literal.push(c);
                continue;
            }
        };
        flush(&mut literal, &mut tokens);
        tokens.push(token);
    }
    flush(&mut literal, &mut tokens);

    tokens
}
