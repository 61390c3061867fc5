/*
 *  rpc.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Line-delimited JSON over a unix socket
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

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

use crate::service::RobotFaceService;
use crate::vision::{CaptureOptions, VisionService};

/// One request line, selected by its `"method"` key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    DoCommand {
        command: Map<String, Value>,
    },
    GetProperties,
    GetDetections {
        #[serde(default)]
        image: Vec<u8>,
    },
    GetDetectionsFromCamera {
        camera_name: String,
    },
    GetClassifications {
        #[serde(default)]
        image: Vec<u8>,
        #[serde(default)]
        count: usize,
    },
    GetClassificationsFromCamera {
        camera_name: String,
        #[serde(default)]
        count: usize,
    },
    GetObjectPointClouds {
        camera_name: String,
    },
    CaptureAllFromCamera {
        camera_name: String,
        #[serde(default)]
        return_image: bool,
        #[serde(default)]
        return_classifications: bool,
        #[serde(default)]
        return_detections: bool,
        #[serde(default)]
        return_object_point_clouds: bool,
    },
}

/// Answer a single request
pub async fn handle(service: &RobotFaceService, request: Request) -> Value {
    match request {
        Request::DoCommand { command } => Value::Object(service.do_command(command).await),
        Request::GetProperties => encode(service.get_properties().await),
        Request::GetDetections { image } => encode(service.get_detections(&image).await),
        Request::GetDetectionsFromCamera { camera_name } => {
            encode(service.get_detections_from_camera(&camera_name).await)
        }
        Request::GetClassifications { image, count } => {
            encode(service.get_classifications(&image, count).await)
        }
        Request::GetClassificationsFromCamera { camera_name, count } => {
            encode(service.get_classifications_from_camera(&camera_name, count).await)
        }
        Request::GetObjectPointClouds { camera_name } => {
            encode(service.get_object_point_clouds(&camera_name).await)
        }
        Request::CaptureAllFromCamera {
            camera_name,
            return_image,
            return_classifications,
            return_detections,
            return_object_point_clouds,
        } => {
            let options = CaptureOptions {
                return_image,
                return_classifications,
                return_detections,
                return_object_point_clouds,
            };
            encode(service.capture_all_from_camera(&camera_name, options).await)
        }
    }
}

fn encode<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| failure(format!("encoding failed: {}", e)))
}

fn failure(message: String) -> Value {
    json!({ "success": false, "error": message })
}

async fn handle_line(service: &RobotFaceService, line: &str) -> Value {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            debug!("rpc request: {:?}", request);
            handle(service, request).await
        }
        Err(e) => failure(format!("malformed request: {}", e)),
    }
}

async fn handle_connection(stream: UnixStream, service: Arc<RobotFaceService>) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&service, &line).await;
        writer.write_all(reply.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

/// Accept connections on `socket` until the task is dropped
///
/// A socket file left behind by an earlier run is removed first.
pub async fn serve(socket: PathBuf, service: Arc<RobotFaceService>) -> anyhow::Result<()> {
    if socket.exists() {
        tokio::fs::remove_file(&socket).await.ok();
    }
    if let Some(dir) = socket.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let listener = UnixListener::bind(&socket)?;
    info!("Listening on {}", socket.display());

    loop {
        let (stream, _) = listener.accept().await?;
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, service).await {
                error!("rpc connection error: {}", e);
            }
        });
    }
}
