/*
 *  lib.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Robot face display - library root
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

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod face;
pub mod rpc;
pub mod service;
pub mod state;
pub mod vision;

pub use command::{Command, CommandError, CommandResult};
pub use dispatcher::{dispatch, respond};
pub use face::{Expression, FaceGeometry};
pub use service::{RobotFaceService, ServiceError};
pub use state::DisplayState;
