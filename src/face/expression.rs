/*
 *  face/expression.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  The closed set of faces the renderer knows how to draw
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Facial expression shown on the panel
///
/// Adding a variant means adding a recipe in `face::render`; the match
/// there is exhaustive so the compiler points at the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Happy,
    Sad,
    Surprised,
    Sleepy,
    #[default]
    Neutral,
    Angry,
    Confused,
    Thinking,
}

impl Expression {
    /// Every expression, in the order they are listed to callers
    pub const ALL: [Expression; 8] = [
        Expression::Happy,
        Expression::Sad,
        Expression::Surprised,
        Expression::Sleepy,
        Expression::Neutral,
        Expression::Angry,
        Expression::Confused,
        Expression::Thinking,
    ];

    /// Wire name, as accepted by `set_face` and reported by `get_face`
    pub fn name(&self) -> &'static str {
        match self {
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Surprised => "surprised",
            Expression::Sleepy => "sleepy",
            Expression::Neutral => "neutral",
            Expression::Angry => "angry",
            Expression::Confused => "confused",
            Expression::Thinking => "thinking",
        }
    }

    /// "[happy, sad, ...]" for error messages
    pub fn listing() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(Expression::name).collect();
        format!("[{}]", names.join(", "))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name is not one of the eight expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExpression(pub String);

impl fmt::Display for UnknownExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown expression '{}'", self.0)
    }
}

impl std::error::Error for UnknownExpression {}

impl FromStr for Expression {
    type Err = UnknownExpression;

    /// Case-sensitive exact match on the wire name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownExpression(s.to_string()))
    }
}
