/*
 *  dispatcher.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Command dispatch against the display state
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

use log::{error, info};
use serde_json::{Map, Value};

use crate::command::{Command, CommandError, CommandResult};
use crate::face::Expression;
use crate::state::DisplayState;

/// Run one command with exclusive access to the state
///
/// Blocks until any frame it produces has been handed to the sink.
pub fn dispatch(command: &Command, state: &mut DisplayState) -> Result<CommandResult, CommandError> {
    match command {
        Command::SetFace { expression } => {
            let expression: Expression = expression
                .parse()
                .map_err(|_| CommandError::InvalidExpression(expression.clone()))?;
            state.show(expression)?;
            info!("Face set to {}", expression);
            Ok(CommandResult::FaceSet(expression))
        }
        Command::GetFace => Ok(CommandResult::CurrentFace(state.current_expression())),
        Command::Clear => {
            state.blank()?;
            Ok(CommandResult::Cleared)
        }
        Command::CustomText { text, x, y } => {
            state.draw_text(text, *x, *y)?;
            Ok(CommandResult::TextDrawn(text.clone()))
        }
        Command::Unknown { name } => Err(CommandError::UnknownCommand(name.clone())),
    }
}

/// Parse, dispatch and render the reply map; failures become `{success: false, error}`
pub fn respond(request: &Map<String, Value>, state: &mut DisplayState) -> Map<String, Value> {
    let outcome = Command::from_request(request).and_then(|command| dispatch(&command, state));
    match outcome {
        Ok(result) => result.to_map(),
        Err(e) => {
            if let CommandError::Transmission(_) = e {
                error!("{}", e);
            }
            e.to_map()
        }
    }
}
