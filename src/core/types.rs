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

//! src/core/types.rs
//!
//! Core type definitions for gesture binding
//!
//! This module defines the fundamental types used throughout the crate:
//! - `Key`: Physical key identifier, including the `None` sentinel
//! - `Modifiers`: Bitwise-composable modifier set (SHIFT, CONTROL, ALT, META)
//! - `Gesture`: A key plus a modifier set, the unit of uniqueness
//! - `BindableEvent`: Application commands that a gesture can trigger
//! - `Binding`: An event/gesture pair with its overridable flag
//!
//! Every type is a small `Copy` value with value equality and hashing, so
//! gestures can be used directly as `HashMap` keys in the reverse index.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::core::parser::{parse_gesture, ParseError};

/// Physical key identifier
///
/// `Key::None` is the sentinel used for "no key": a gesture built from it
/// never matches real input.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Key {
    None,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    MediaPlayPause,
    MediaStop,
    MediaNextTrack,
    MediaPreviousTrack,
}

/// Canonical display names, also accepted (case-insensitively) when parsing
const KEY_NAMES: &[(Key, &str)] = &[
    (Key::None, "NONE"),
    (Key::A, "A"),
    (Key::B, "B"),
    (Key::C, "C"),
    (Key::D, "D"),
    (Key::E, "E"),
    (Key::F, "F"),
    (Key::G, "G"),
    (Key::H, "H"),
    (Key::I, "I"),
    (Key::J, "J"),
    (Key::K, "K"),
    (Key::L, "L"),
    (Key::M, "M"),
    (Key::N, "N"),
    (Key::O, "O"),
    (Key::P, "P"),
    (Key::Q, "Q"),
    (Key::R, "R"),
    (Key::S, "S"),
    (Key::T, "T"),
    (Key::U, "U"),
    (Key::V, "V"),
    (Key::W, "W"),
    (Key::X, "X"),
    (Key::Y, "Y"),
    (Key::Z, "Z"),
    (Key::D0, "0"),
    (Key::D1, "1"),
    (Key::D2, "2"),
    (Key::D3, "3"),
    (Key::D4, "4"),
    (Key::D5, "5"),
    (Key::D6, "6"),
    (Key::D7, "7"),
    (Key::D8, "8"),
    (Key::D9, "9"),
    (Key::F1, "F1"),
    (Key::F2, "F2"),
    (Key::F3, "F3"),
    (Key::F4, "F4"),
    (Key::F5, "F5"),
    (Key::F6, "F6"),
    (Key::F7, "F7"),
    (Key::F8, "F8"),
    (Key::F9, "F9"),
    (Key::F10, "F10"),
    (Key::F11, "F11"),
    (Key::F12, "F12"),
    (Key::Up, "Up"),
    (Key::Down, "Down"),
    (Key::Left, "Left"),
    (Key::Right, "Right"),
    (Key::PageUp, "PageUp"),
    (Key::PageDown, "PageDown"),
    (Key::Home, "Home"),
    (Key::End, "End"),
    (Key::Insert, "Insert"),
    (Key::Delete, "Delete"),
    (Key::Escape, "Escape"),
    (Key::Enter, "Enter"),
    (Key::Space, "Space"),
    (Key::Tab, "Tab"),
    (Key::Backspace, "Backspace"),
    (Key::VolumeUp, "VolumeUp"),
    (Key::VolumeDown, "VolumeDown"),
    (Key::VolumeMute, "VolumeMute"),
    (Key::MediaPlayPause, "MediaPlayPause"),
    (Key::MediaStop, "MediaStop"),
    (Key::MediaNextTrack, "MediaNextTrack"),
    (Key::MediaPreviousTrack, "MediaPreviousTrack"),
];

/// Alternative spellings seen in other tools' key names
const KEY_ALIASES: &[(Key, &str)] = &[
    (Key::Escape, "Esc"),
    (Key::Enter, "Return"),
    (Key::PageUp, "PgUp"),
    (Key::PageUp, "Prior"),
    (Key::PageDown, "PgDn"),
    (Key::PageDown, "Next"),
    (Key::Delete, "Del"),
    (Key::Insert, "Ins"),
];

impl Key {
    /// Canonical name used for display and in the store file
    pub fn name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, name)| *name)
            .unwrap_or("NONE")
    }

    /// Looks up a key by canonical name or alias, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        KEY_NAMES
            .iter()
            .chain(KEY_ALIASES.iter())
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_name(s.trim()).ok_or_else(|| ParseError::UnknownKey(s.trim().to_string()))
    }
}

bitflags! {
    /// Modifier keys held while the primary key is pressed
    ///
    /// Flags compose bitwise; the empty set means "no modifiers".
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Display order for modifiers in gesture text
const MODIFIER_ORDER: &[(Modifiers, &str)] = &[
    (Modifiers::CONTROL, "CTRL"),
    (Modifiers::ALT, "ALT"),
    (Modifiers::SHIFT, "SHIFT"),
    (Modifiers::META, "META"),
];

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::empty();

    /// Maps a single modifier name to its flag
    ///
    /// Accepts the names used by most desktop toolkits:
    /// - SHIFT
    /// - CTRL / CONTROL
    /// - ALT / OPTION
    /// - META / SUPER / WIN / CMD
    pub fn from_alias(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "SHIFT" => Some(Modifiers::SHIFT),
            "CTRL" | "CONTROL" => Some(Modifiers::CONTROL),
            "ALT" | "OPTION" => Some(Modifiers::ALT),
            "META" | "SUPER" | "WIN" | "CMD" => Some(Modifiers::META),
            _ => None,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = MODIFIER_ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();

        f.write_str(&names.join("+"))
    }
}

/// A primary key combined with a set of modifiers
///
/// Two gestures are equal iff key and modifier set are equal. A gesture on
/// `Key::None` is normalised to [`Gesture::NONE`], the "unbound" sentinel.
///
/// # Example
/// ```
/// use gesture_binding_manager::core::{Gesture, Key, Modifiers};
///
/// let gesture = Gesture::new(Key::F11, Modifiers::CONTROL | Modifiers::SHIFT);
/// assert_eq!(gesture.to_string(), "CTRL+SHIFT+F11");
/// assert_eq!("shift+ctrl+f11".parse::<Gesture>().unwrap(), gesture);
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Gesture {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl Gesture {
    /// The sentinel gesture: no key, no modifiers
    pub const NONE: Gesture = Gesture {
        key: Key::None,
        modifiers: Modifiers::NONE,
    };

    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        if matches!(key, Key::None) {
            return Self::NONE;
        }
        Self { key, modifiers }
    }

    /// A gesture with no modifiers
    pub const fn key(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// True for the sentinel gesture
    pub const fn is_none(&self) -> bool {
        matches!(self.key, Key::None)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

impl FromStr for Gesture {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_gesture(s)
    }
}

/// Application commands that can be triggered by a gesture
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BindableEvent {
    ToggleFullscreen,
    IncreaseVolume,
    DecreaseVolume,
    ToggleVolumeMute,
}

impl BindableEvent {
    pub const ALL: [BindableEvent; 4] = [
        BindableEvent::ToggleFullscreen,
        BindableEvent::IncreaseVolume,
        BindableEvent::DecreaseVolume,
        BindableEvent::ToggleVolumeMute,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BindableEvent::ToggleFullscreen => "ToggleFullscreen",
            BindableEvent::IncreaseVolume => "IncreaseVolume",
            BindableEvent::DecreaseVolume => "DecreaseVolume",
            BindableEvent::ToggleVolumeMute => "ToggleVolumeMute",
        }
    }
}

impl fmt::Display for BindableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BindableEvent {
    type Err = ParseError;

    /// Accepts `ToggleFullscreen`, `toggle-fullscreen` and `toggle_fullscreen`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>();

        BindableEvent::ALL
            .into_iter()
            .find(|event| event.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseError::UnknownEvent(s.trim().to_string()))
    }
}

/// An event bound to a gesture
///
/// `overridable == false` marks a protected factory default: it can never be
/// removed or replaced through the registry's mutation API.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Binding {
    pub event: BindableEvent,
    pub gesture: Gesture,
    pub overridable: bool,
}

impl Binding {
    pub const fn new(event: BindableEvent, gesture: Gesture, overridable: bool) -> Self {
        Self {
            event,
            gesture,
            overridable,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.event, self.gesture)?;

        if !self.overridable {
            write!(f, " (protected)")?;
        }

        Ok(())
    }
}
