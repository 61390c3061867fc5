/*
 *  service.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Robot face service - serialized command execution over the display state
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

use std::sync::Arc;

use log::{error, info};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::command::CommandError;
use crate::config::{ConfigError, DisplayConfig, PanelSettings};
use crate::dispatcher::respond;
use crate::display::error::DisplayFactoryError;
use crate::display::factory::SinkFactory;
use crate::state::DisplayState;
use crate::vision::{
    CaptureAllResponse, CaptureOptions, Classification, Detection, PointCloudObject,
    VisionProperties, VisionService,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("display error: {0}")]
    Display(#[from] DisplayFactoryError),
    #[error("worker failed: {0}")]
    Worker(String),
}

/// The component a host talks to
///
/// Every command takes the state lock on a blocking worker and keeps it
/// until its frame is out, so sink writes never interleave.
pub struct RobotFaceService {
    state: Arc<Mutex<DisplayState>>,
}

impl RobotFaceService {
    pub fn new(state: DisplayState) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Build the sink and state for `panel`
    pub fn from_panel(panel: &PanelSettings) -> Result<Self, ServiceError> {
        Ok(Self::new(build_state(panel)?))
    }

    /// Build from a host's untyped attribute map
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ServiceError> {
        let panel = DisplayConfig::from_attributes(attributes)?.resolve()?;
        Self::from_panel(&panel)
    }

    /// Execute one command map; never fails, errors come back as `{success: false}`
    pub async fn do_command(&self, request: Map<String, Value>) -> Map<String, Value> {
        let state = Arc::clone(&self.state);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut guard = state.blocking_lock();
            respond(&request, &mut guard)
        })
        .await;

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                error!("Command worker failed: {}", e);
                CommandError::Worker(e.to_string()).to_map()
            }
        }
    }

    /// Replace the display state with one built from new attributes
    ///
    /// The old sink is released before the new one is opened since both may
    /// want the same bus. If the new panel fails to come up the service keeps
    /// running without one.
    pub async fn reconfigure(&self, attributes: &Map<String, Value>) -> Result<(), ServiceError> {
        let panel = DisplayConfig::from_attributes(attributes)?.resolve()?;
        let state = Arc::clone(&self.state);

        tokio::task::spawn_blocking(move || {
            let mut guard = state.blocking_lock();
            guard.close();
            match build_state(&panel) {
                Ok(fresh) => {
                    *guard = fresh;
                    info!("Reconfigured for {}x{} {}", panel.width, panel.height, panel.driver.name());
                    Ok(())
                }
                Err(e) => {
                    error!("Reconfigure failed, continuing without a display: {}", e);
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))?
    }

    /// Blank the panel and release it
    pub async fn close(&self) {
        let state = Arc::clone(&self.state);
        if let Err(e) = tokio::task::spawn_blocking(move || state.blocking_lock().close()).await {
            error!("Close failed: {}", e);
        }
    }
}

fn build_state(panel: &PanelSettings) -> Result<DisplayState, ServiceError> {
    let sink = SinkFactory::create_from_config(panel)?;
    let state = DisplayState::new(panel.width, panel.height, sink)
        .map_err(DisplayFactoryError::from)?;
    Ok(state)
}

impl VisionService for RobotFaceService {
    async fn get_detections(&self, _image: &[u8]) -> Vec<Detection> {
        Vec::new()
    }

    async fn get_detections_from_camera(&self, _camera_name: &str) -> Vec<Detection> {
        Vec::new()
    }

    async fn get_classifications(&self, _image: &[u8], _count: usize) -> Vec<Classification> {
        Vec::new()
    }

    async fn get_classifications_from_camera(&self, _camera_name: &str, _count: usize) -> Vec<Classification> {
        Vec::new()
    }

    async fn get_object_point_clouds(&self, _camera_name: &str) -> Vec<PointCloudObject> {
        Vec::new()
    }

    async fn capture_all_from_camera(&self, _camera_name: &str, _options: CaptureOptions) -> CaptureAllResponse {
        CaptureAllResponse::default()
    }

    async fn get_properties(&self) -> VisionProperties {
        VisionProperties {
            classifications_supported: false,
            detections_supported: false,
            object_point_clouds_supported: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::MockSink;
    use serde_json::json;

    fn request(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn service_with_mock() -> (RobotFaceService, MockSink) {
        let mock = MockSink::new(240, 240);
        let state = DisplayState::new(240, 240, Some(Box::new(mock.clone()))).unwrap();
        (RobotFaceService::new(state), mock)
    }

    #[tokio::test]
    async fn test_do_command_round_trip() {
        let (service, _mock) = service_with_mock();
        let reply = service.do_command(request(json!({"command": "set_face", "expression": "thinking"}))).await;
        assert_eq!(reply["success"], json!(true));

        let reply = service.do_command(request(json!({"command": "get_face"}))).await;
        assert_eq!(reply["current_face"], json!("thinking"));
    }

    #[tokio::test]
    async fn test_headless_from_attributes() {
        let service = RobotFaceService::from_attributes(&request(json!({"headless": true}))).unwrap();
        let reply = service.do_command(request(json!({"command": "custom_text", "text": "hi"}))).await;
        assert_eq!(Value::Object(reply), json!({"success": true, "text": "hi"}));
    }

    #[tokio::test]
    async fn test_reconfigure_replaces_state() {
        let (service, mock) = service_with_mock();
        service.do_command(request(json!({"command": "set_face", "expression": "angry"}))).await;

        service.reconfigure(&request(json!({"headless": true, "width": 128, "height": 160}))).await.unwrap();

        // old panel blanked and released, face back to neutral
        assert!(mock.last_frame().unwrap().is_blank());
        let reply = service.do_command(request(json!({"command": "get_face"}))).await;
        assert_eq!(reply["current_face"], json!("neutral"));
    }

    #[tokio::test]
    async fn test_reconfigure_rejects_bad_attributes() {
        let (service, mock) = service_with_mock();
        let frames = mock.frame_count();
        let err = service.reconfigure(&request(json!({"rotation": 45}))).await;
        assert!(matches!(err, Err(ServiceError::Config(_))));
        assert_eq!(mock.frame_count(), frames);
    }

    #[tokio::test]
    async fn test_close_blanks_once() {
        let (service, mock) = service_with_mock();
        service.close().await;
        assert!(mock.last_frame().unwrap().is_blank());
        let frames = mock.frame_count();
        service.close().await;
        assert_eq!(mock.frame_count(), frames);
    }

    #[tokio::test]
    async fn test_vision_surface_is_empty() {
        let (service, _mock) = service_with_mock();
        assert!(service.get_detections(&[1, 2, 3]).await.is_empty());
        assert!(service.get_detections_from_camera("cam").await.is_empty());
        assert!(service.get_classifications(&[], 5).await.is_empty());
        assert!(service.get_classifications_from_camera("cam", 5).await.is_empty());
        assert!(service.get_object_point_clouds("cam").await.is_empty());
        assert_eq!(
            service.capture_all_from_camera("cam", CaptureOptions::default()).await,
            CaptureAllResponse::default()
        );
        assert_eq!(service.get_properties().await, VisionProperties::default());
    }
}
