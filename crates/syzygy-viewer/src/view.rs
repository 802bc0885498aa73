//! Aggregated view state and overlay derivation.

use crate::message::{
    CameraMeta, EdgeSiteList, EdgeState, ImageFrame, PoseEstimate, SourceId, StreamMessage,
    StreamPayload,
};
use std::time::Duration;
use syzygy_core::Tuple;
use tracing::{error, warn};

/// Last-known pose from the tracking pipeline.
///
/// An explicit sum type so the "tracking failed" display branch is a
/// checked case rather than a null test.
#[derive(Debug, Clone, Default)]
pub enum TrackingState {
    #[default]
    NotTracking,
    Tracked(PoseEstimate),
}

impl TrackingState {
    /// The status line drawn in the image corner.
    pub fn status_line(&self) -> String {
        match self {
            TrackingState::Tracked(pose) => format!(
                "tracking (x={:.3} y={:.3} z={:.3})",
                pose.translation[0], pose.translation[1], pose.translation[2]
            ),
            TrackingState::NotTracking => "tracking failed".to_string(),
        }
    }
}

/// Colors available for overlay drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayColor {
    Green,
    Blue,
    Purple,
    Red,
    Black,
}

/// Color convention for moving-edge sites.
pub fn site_color(state: EdgeState) -> OverlayColor {
    match state {
        EdgeState::Tracked => OverlayColor::Green,
        EdgeState::SuppressedContrast => OverlayColor::Blue,
        EdgeState::SuppressedThreshold => OverlayColor::Purple,
        EdgeState::SuppressedMEstimator => OverlayColor::Red,
        EdgeState::Unknown(_) => OverlayColor::Black,
    }
}

/// A cross drawn at one moving-edge site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteMarker {
    pub x: f64,
    pub y: f64,
    pub color: OverlayColor,
}

/// Everything the display sink draws on top of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub status_line: String,
    pub time_line: Option<String>,
    pub topic_line: String,
    pub markers: Vec<SiteMarker>,
}

/// The latest view assembled from emitted tuples.
#[derive(Debug, Default)]
pub struct ViewState {
    image: Option<ImageFrame>,
    meta: Option<CameraMeta>,
    tracking: TrackingState,
    edges: Option<EdgeSiteList>,
    last_pivot: Option<Duration>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame to display, once at least one tuple has been emitted.
    pub fn image(&self) -> Option<&ImageFrame> {
        self.image.as_ref()
    }

    pub fn tracking(&self) -> &TrackingState {
        &self.tracking
    }

    pub fn last_pivot(&self) -> Option<Duration> {
        self.last_pivot
    }

    /// Fold one emitted tuple into the view.
    pub fn apply(&mut self, tuple: Tuple<SourceId, StreamMessage>) {
        self.last_pivot = Some(tuple.pivot());

        for (source, msg) in tuple.into_items() {
            // A payload disagreeing with its stream key means the transport
            // wired a sender to the wrong stream.
            if msg.source() != source {
                warn!(
                    stream = %source,
                    payload = %msg.source(),
                    "payload type does not match its stream; skipping"
                );
                continue;
            }

            match msg.payload {
                StreamPayload::Image(frame) => {
                    if frame.is_empty() {
                        error!("dropping frame without dimensions");
                    } else {
                        self.image = Some(frame);
                    }
                }
                StreamPayload::CameraMeta(meta) => self.meta = Some(meta),
                StreamPayload::Pose(pose) => self.tracking = TrackingState::Tracked(pose),
                StreamPayload::EdgeSites(sites) => {
                    for site in &sites.sites {
                        if let EdgeState::Unknown(code) = site.state {
                            error!(code, "bad suppress value");
                        }
                    }
                    self.edges = Some(sites);
                }
            }
        }
    }

    /// Derive the overlay for the current view.
    pub fn overlay(&self, camera_topic: &str) -> Overlay {
        let markers = self
            .edges
            .iter()
            .flat_map(|list| list.sites.iter())
            .map(|site| SiteMarker {
                x: site.x,
                y: site.y,
                color: site_color(site.state),
            })
            .collect();

        Overlay {
            status_line: self.tracking.status_line(),
            time_line: self
                .last_pivot
                .map(|pivot| format!("time = {:.3}", pivot.as_secs_f64())),
            topic_line: format!("camera topic = {camera_topic}"),
            markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{EdgeSite, StreamMessage};
    use indexmap::IndexMap;
    use syzygy_core::{SyncConfig, Synchronizer};

    fn aligned_tuple(base_ms: u64) -> Tuple<SourceId, StreamMessage> {
        let mut sync: Synchronizer<SourceId, StreamMessage> =
            Synchronizer::new(SourceId::ALL, &SyncConfig::default()).unwrap();

        let ts = |offset: u64| Duration::from_millis(base_ms + offset);
        let mut tuple = None;
        let messages: IndexMap<SourceId, StreamMessage> = [
            (
                SourceId::Image,
                StreamMessage::image(ts(0), ImageFrame::new(4, 4, vec![0; 16])),
            ),
            (
                SourceId::CameraMeta,
                StreamMessage::camera_meta(
                    ts(1),
                    CameraMeta {
                        frame_id: "camera".to_string(),
                        focal: (600.0, 600.0),
                        principal_point: (320.0, 240.0),
                    },
                ),
            ),
            (
                SourceId::Pose,
                StreamMessage::pose(ts(2), PoseEstimate::new([0.1, 0.2, 0.3], [0.0, 0.0, 0.0, 1.0])),
            ),
            (
                SourceId::EdgeSites,
                StreamMessage::edge_sites(
                    ts(3),
                    EdgeSiteList {
                        sites: vec![
                            EdgeSite {
                                x: 10.0,
                                y: 20.0,
                                state: EdgeState::Tracked,
                            },
                            EdgeSite {
                                x: 11.0,
                                y: 21.0,
                                state: EdgeState::SuppressedMEstimator,
                            },
                        ],
                    },
                ),
            ),
        ]
        .into_iter()
        .collect();

        for (source, msg) in messages {
            tuple = sync.push(&source, msg);
        }
        tuple.expect("four aligned messages form a tuple")
    }

    #[test]
    fn test_view_starts_without_image_or_pose() {
        let state = ViewState::new();
        assert!(state.image().is_none());
        assert!(matches!(state.tracking(), TrackingState::NotTracking));
        assert_eq!(state.tracking().status_line(), "tracking failed");
    }

    #[test]
    fn test_apply_updates_all_channels() {
        let mut state = ViewState::new();
        state.apply(aligned_tuple(1000));

        assert!(state.image().is_some());
        assert_eq!(state.last_pivot(), Some(Duration::from_millis(1003)));
        assert_eq!(
            state.tracking().status_line(),
            "tracking (x=0.100 y=0.200 z=0.300)"
        );
    }

    #[test]
    fn test_overlay_derivation() {
        let mut state = ViewState::new();
        state.apply(aligned_tuple(2000));

        let overlay = state.overlay("/camera/image_rect");
        assert_eq!(overlay.topic_line, "camera topic = /camera/image_rect");
        assert_eq!(overlay.time_line.as_deref(), Some("time = 2.003"));
        assert_eq!(overlay.markers.len(), 2);
        assert_eq!(overlay.markers[0].color, OverlayColor::Green);
        assert_eq!(overlay.markers[1].color, OverlayColor::Red);
    }

    #[test]
    fn test_site_colors() {
        assert_eq!(site_color(EdgeState::Tracked), OverlayColor::Green);
        assert_eq!(site_color(EdgeState::SuppressedContrast), OverlayColor::Blue);
        assert_eq!(
            site_color(EdgeState::SuppressedThreshold),
            OverlayColor::Purple
        );
        assert_eq!(
            site_color(EdgeState::SuppressedMEstimator),
            OverlayColor::Red
        );
        assert_eq!(site_color(EdgeState::Unknown(9)), OverlayColor::Black);
    }
}
