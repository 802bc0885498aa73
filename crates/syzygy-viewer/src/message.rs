//! Domain message types for the viewer's input streams.

use std::{fmt, time::Duration};
use syzygy_core::WithTimestamp;

/// Identifies one of the viewer's four input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Rectified camera frames.
    Image,
    /// Camera calibration metadata.
    CameraMeta,
    /// Pose-with-covariance estimates from the tracking pipeline.
    Pose,
    /// Moving-edge sites sampled by the tracker.
    EdgeSites,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Image,
        SourceId::CameraMeta,
        SourceId::Pose,
        SourceId::EdgeSites,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SourceId::Image => "image",
            SourceId::CameraMeta => "camera_info",
            SourceId::Pose => "pose",
            SourceId::EdgeSites => "edge_sites",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One grayscale video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Calibration metadata published alongside each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMeta {
    pub frame_id: String,
    /// Focal lengths in pixels (fx, fy).
    pub focal: (f64, f64),
    /// Principal point in pixels (cx, cy).
    pub principal_point: (f64, f64),
}

/// Pose estimate with covariance from the tracking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEstimate {
    pub translation: [f64; 3],
    /// Orientation quaternion (x, y, z, w).
    pub rotation: [f64; 4],
    /// Row-major 6x6 covariance over (x, y, z, roll, pitch, yaw).
    pub covariance: [f64; 36],
}

impl PoseEstimate {
    pub fn new(translation: [f64; 3], rotation: [f64; 4]) -> Self {
        Self {
            translation,
            rotation,
            covariance: [0.0; 36],
        }
    }
}

/// Classification of one moving-edge site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    /// The site is tracked.
    Tracked,
    /// Suppressed by the contrast test.
    SuppressedContrast,
    /// Suppressed by the threshold test.
    SuppressedThreshold,
    /// Suppressed by the M-estimator.
    SuppressedMEstimator,
    /// An unrecognized suppression code from the tracker.
    Unknown(u8),
}

impl EdgeState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => EdgeState::Tracked,
            1 => EdgeState::SuppressedContrast,
            2 => EdgeState::SuppressedThreshold,
            4 => EdgeState::SuppressedMEstimator,
            other => EdgeState::Unknown(other),
        }
    }
}

/// One moving-edge site in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSite {
    pub x: f64,
    pub y: f64,
    pub state: EdgeState,
}

/// The moving-edge sites sampled for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeSiteList {
    pub sites: Vec<EdgeSite>,
}

/// Payload of one stream message.
#[derive(Debug, Clone)]
pub enum StreamPayload {
    Image(ImageFrame),
    CameraMeta(CameraMeta),
    Pose(PoseEstimate),
    EdgeSites(EdgeSiteList),
}

/// A timestamped message from one of the viewer's input streams.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub timestamp: Duration,
    pub payload: StreamPayload,
}

impl StreamMessage {
    pub fn image(timestamp: Duration, frame: ImageFrame) -> Self {
        Self {
            timestamp,
            payload: StreamPayload::Image(frame),
        }
    }

    pub fn camera_meta(timestamp: Duration, meta: CameraMeta) -> Self {
        Self {
            timestamp,
            payload: StreamPayload::CameraMeta(meta),
        }
    }

    pub fn pose(timestamp: Duration, pose: PoseEstimate) -> Self {
        Self {
            timestamp,
            payload: StreamPayload::Pose(pose),
        }
    }

    pub fn edge_sites(timestamp: Duration, sites: EdgeSiteList) -> Self {
        Self {
            timestamp,
            payload: StreamPayload::EdgeSites(sites),
        }
    }

    /// The stream this payload belongs to.
    pub fn source(&self) -> SourceId {
        match &self.payload {
            StreamPayload::Image(_) => SourceId::Image,
            StreamPayload::CameraMeta(_) => SourceId::CameraMeta,
            StreamPayload::Pose(_) => SourceId::Pose,
            StreamPayload::EdgeSites(_) => SourceId::EdgeSites,
        }
    }
}

impl WithTimestamp for StreamMessage {
    fn timestamp(&self) -> Duration {
        self.timestamp
    }
}
