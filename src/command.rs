/*
 *  command.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Untyped command maps parsed into typed commands and results
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

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::display::error::DisplayError;
use crate::face::Expression;

/// Default `custom_text` position
pub const DEFAULT_TEXT_X: i32 = 10;
pub const DEFAULT_TEXT_Y: i32 = 50;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid expression, must be one of: {}", Expression::listing())]
    InvalidExpression(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("invalid argument {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },
    #[error("display write failed: {0}")]
    Transmission(#[from] DisplayError),
    #[error("command worker failed: {0}")]
    Worker(String),
}

impl CommandError {
    /// `{success: false, error}` reply
    pub fn to_map(&self) -> Map<String, Value> {
        reply(json!({ "success": false, "error": self.to_string() }))
    }
}

/// A request after parsing
///
/// Expression names are carried as text; checking them against the closed
/// set is the dispatcher's job so the error reply can name the bad value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetFace { expression: String },
    GetFace,
    Clear,
    CustomText { text: String, x: i32, y: i32 },
    Unknown { name: String },
}

impl Command {
    /// Parse the `"command"` key and its arguments
    ///
    /// Only coordinates that cannot be read as integers are rejected here.
    pub fn from_request(request: &Map<String, Value>) -> Result<Self, CommandError> {
        let name = match request.get("command") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let command = match name.as_str() {
            "set_face" => Command::SetFace {
                expression: text_arg(request, "expression", Expression::Neutral.name()),
            },
            "get_face" => Command::GetFace,
            "clear" => Command::Clear,
            "custom_text" => Command::CustomText {
                text: text_arg(request, "text", ""),
                x: int_arg(request, "x", DEFAULT_TEXT_X)?,
                y: int_arg(request, "y", DEFAULT_TEXT_Y)?,
            },
            _ => Command::Unknown { name },
        };
        Ok(command)
    }
}

fn text_arg(request: &Map<String, Value>, key: &str, default: &str) -> String {
    match request.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

/// Integers, floats (truncated) and numeric strings are accepted
fn int_arg(request: &Map<String, Value>, key: &'static str, default: i32) -> Result<i32, CommandError> {
    let Some(value) = request.get(key) else {
        return Ok(default);
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    parsed
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| CommandError::InvalidArgument { name: key, value: value.to_string() })
}

/// Successful outcome of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    FaceSet(Expression),
    CurrentFace(Expression),
    Cleared,
    TextDrawn(String),
}

impl CommandResult {
    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            CommandResult::FaceSet(e) => reply(json!({ "success": true, "expression": e.name() })),
            CommandResult::CurrentFace(e) => reply(json!({ "current_face": e.name() })),
            CommandResult::Cleared => reply(json!({ "success": true })),
            CommandResult::TextDrawn(text) => reply(json!({ "success": true, "text": text })),
        }
    }
}

fn reply(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_set_face() {
        let cmd = Command::from_request(&request(json!({"command": "set_face", "expression": "happy"}))).unwrap();
        assert_eq!(cmd, Command::SetFace { expression: "happy".to_string() });
    }

    #[test]
    fn test_set_face_defaults_to_neutral() {
        let cmd = Command::from_request(&request(json!({"command": "set_face"}))).unwrap();
        assert_eq!(cmd, Command::SetFace { expression: "neutral".to_string() });
    }

    #[test]
    fn test_unknown_expression_is_not_rejected_at_parse() {
        let cmd = Command::from_request(&request(json!({"command": "set_face", "expression": "grumpy"}))).unwrap();
        assert_eq!(cmd, Command::SetFace { expression: "grumpy".to_string() });
    }

    #[test]
    fn test_parse_custom_text_defaults() {
        let cmd = Command::from_request(&request(json!({"command": "custom_text"}))).unwrap();
        assert_eq!(cmd, Command::CustomText { text: String::new(), x: 10, y: 50 });
    }

    #[test]
    fn test_coordinates_are_coerced() {
        let cmd = Command::from_request(&request(json!({
            "command": "custom_text", "text": "hi", "x": 12.9, "y": " 70 "
        }))).unwrap();
        assert_eq!(cmd, Command::CustomText { text: "hi".to_string(), x: 12, y: 70 });
    }

    #[test]
    fn test_bad_coordinate() {
        let err = Command::from_request(&request(json!({"command": "custom_text", "x": "left"}))).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "x", .. }));
        assert_eq!(err.to_map()["success"], json!(false));
    }

    #[test]
    fn test_unknown_and_missing_command() {
        assert_eq!(
            Command::from_request(&request(json!({"command": "foo"}))).unwrap(),
            Command::Unknown { name: "foo".to_string() }
        );
        assert_eq!(
            Command::from_request(&request(json!({}))).unwrap(),
            Command::Unknown { name: String::new() }
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CommandError::InvalidExpression("grumpy".to_string()).to_string(),
            "invalid expression, must be one of: [happy, sad, surprised, sleepy, neutral, angry, confused, thinking]"
        );
        assert_eq!(CommandError::UnknownCommand("foo".to_string()).to_string(), "unknown command: foo");
    }

    #[test]
    fn test_result_maps() {
        assert_eq!(
            Value::Object(CommandResult::FaceSet(Expression::Happy).to_map()),
            json!({"success": true, "expression": "happy"})
        );
        assert_eq!(
            Value::Object(CommandResult::CurrentFace(Expression::Neutral).to_map()),
            json!({"current_face": "neutral"})
        );
        assert_eq!(Value::Object(CommandResult::Cleared.to_map()), json!({"success": true}));
    }
}
