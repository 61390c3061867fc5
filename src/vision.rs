/*
 *  vision.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Vision service surface - the face neither sees nor classifies
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

#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};

/// Bounding box in image pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
    pub confidence: f64,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub class_name: String,
    pub confidence: f64,
}

/// Segmented object as PCD bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudObject {
    pub point_cloud: Vec<u8>,
}

/// What a `capture_all_from_camera` caller wants back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    pub return_image: bool,
    pub return_classifications: bool,
    pub return_detections: bool,
    pub return_object_point_clouds: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureAllResponse {
    pub image: Option<Vec<u8>>,
    pub detections: Vec<Detection>,
    pub classifications: Vec<Classification>,
    pub objects: Vec<PointCloudObject>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionProperties {
    pub classifications_supported: bool,
    pub detections_supported: bool,
    pub object_point_clouds_supported: bool,
}

/// Methods a host expects from any vision-typed component
pub trait VisionService {
    async fn get_detections(&self, image: &[u8]) -> Vec<Detection>;

    async fn get_detections_from_camera(&self, camera_name: &str) -> Vec<Detection>;

    async fn get_classifications(&self, image: &[u8], count: usize) -> Vec<Classification>;

    async fn get_classifications_from_camera(&self, camera_name: &str, count: usize) -> Vec<Classification>;

    async fn get_object_point_clouds(&self, camera_name: &str) -> Vec<PointCloudObject>;

    async fn capture_all_from_camera(&self, camera_name: &str, options: CaptureOptions) -> CaptureAllResponse;

    async fn get_properties(&self) -> VisionProperties;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_options_default_to_false() {
        let opts: CaptureOptions = serde_json::from_value(json!({"return_image": true})).unwrap();
        assert!(opts.return_image);
        assert!(!opts.return_detections);
    }

    #[test]
    fn test_empty_capture_serializes() {
        let value = serde_json::to_value(CaptureAllResponse::default()).unwrap();
        assert_eq!(value, json!({"image": null, "detections": [], "classifications": [], "objects": []}));
    }
}
