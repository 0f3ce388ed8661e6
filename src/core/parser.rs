// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Gesture and store-line parser
//!
//! This module parses two textual forms:
//! - Gestures: `CTRL+SHIFT+F11`, `F11`, `alt + enter`, `NONE`
//! - Store lines: `bind = ToggleFullscreen, CTRL+F11`
//!
//! # Architecture
//! The parser uses nom combinators to split the text into tokens, then maps
//! the tokens onto typed values. Whole-file parsing is lenient: a malformed
//! line is recorded and skipped, never fatal, so one bad entry cannot
//! prevent the rest of the store from loading.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0},
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};
use thiserror::Error;

use crate::core::types::{BindableEvent, Gesture, Key, Modifiers};

/// Parse errors with line number context
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("Unknown bindable event '{0}'")]
    UnknownEvent(String),

    #[error("Empty gesture")]
    EmptyGesture,
}

/// Result of parsing a whole store file
#[derive(Debug, Default)]
pub struct ParsedStore {
    /// Successfully parsed (line number, event, gesture) entries, in file order
    pub entries: Vec<(usize, BindableEvent, Gesture)>,
    /// Lines that could not be parsed
    pub skipped: Vec<ParseError>,
}

/// Parse a gesture such as `CTRL+SHIFT+F11`
///
/// The last `+`-separated token is the key, every token before it must be a
/// modifier. Case and surrounding whitespace are ignored.
///
/// # Example
/// ```
/// use gesture_binding_manager::core::{parser::parse_gesture, Gesture, Key, Modifiers};
///
/// let gesture = parse_gesture("ctrl + Up").unwrap();
/// assert_eq!(gesture, Gesture::new(Key::Up, Modifiers::CONTROL));
/// ```
pub fn parse_gesture(input: &str) -> Result<Gesture, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyGesture);
    }

    let (rest, tokens) = gesture_tokens(trimmed).map_err(|e| ParseError::InvalidSyntax {
        line: 1,
        message: format!("{:?}", e),
    })?;

    if !rest.trim().is_empty() {
        return Err(ParseError::InvalidSyntax {
            line: 1,
            message: format!("unexpected trailing input '{}'", rest.trim()),
        });
    }

    gesture_from_tokens(&tokens)
}

/// Parse one store line
///
/// Format: `bind = EVENT, GESTURE`
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_store_line(line: &str) -> Result<Option<(BindableEvent, Gesture)>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (rest, (event_name, tokens)) = bind_line(trimmed).map_err(|e| ParseError::InvalidSyntax {
        line: 1,
        message: format!("{:?}", e),
    })?;

    if !rest.trim().is_empty() {
        return Err(ParseError::InvalidSyntax {
            line: 1,
            message: format!("unexpected trailing input '{}'", rest.trim()),
        });
    }

    let event = event_name.parse::<BindableEvent>()?;
    let gesture = gesture_from_tokens(&tokens)?;

    Ok(Some((event, gesture)))
}

/// Parse a complete store file, skipping malformed lines
///
/// Every skipped line is reported as `ParseError::InvalidSyntax` carrying
/// its 1-based line number.
pub fn parse_store(content: &str) -> ParsedStore {
    let mut parsed = ParsedStore::default();

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;

        match parse_store_line(line) {
            Ok(Some((event, gesture))) => parsed.entries.push((line_num, event, gesture)),
            Ok(None) => {}
            Err(e) => parsed.skipped.push(ParseError::InvalidSyntax {
                line: line_num,
                message: match e {
                    ParseError::InvalidSyntax { message, .. } => message,
                    other => other.to_string(),
                },
            }),
        }
    }

    parsed
}

/// Render one store line, the inverse of [`parse_store_line`]
pub fn format_store_line(event: BindableEvent, gesture: &Gesture) -> String {
    format!("bind = {}, {}", event, gesture)
}

/// Key, modifier and event names: letters, digits, `_` and `-`
fn name_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-').parse(input)
}

/// `+`-separated tokens, whitespace allowed around each `+`
fn gesture_tokens(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1((space0, char('+'), space0), name_token).parse(input)
}

/// `bind = EVENT, GESTURE`
fn bind_line(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
    (
        preceded((tag("bind"), space0, char('='), space0), name_token),
        preceded((space0, char(','), space0), gesture_tokens),
    )
        .parse(input)
}

fn gesture_from_tokens(tokens: &[&str]) -> Result<Gesture, ParseError> {
    let Some((key_name, modifier_names)) = tokens.split_last() else {
        return Err(ParseError::EmptyGesture);
    };

    let key = key_name.parse::<Key>()?;

    let mut modifiers = Modifiers::NONE;
    for name in modifier_names {
        let flag = Modifiers::from_alias(name)
            .ok_or_else(|| ParseError::UnknownModifier(name.to_string()))?;
        modifiers |= flag;
    }

    Ok(Gesture::new(key, modifiers))
}
