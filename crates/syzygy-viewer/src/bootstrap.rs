//! Startup plumbing: topic resolution and readiness polling.

use crate::{message::SourceId, viewer::ShutdownFlag};
use eyre::{Result, bail, ensure};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Fully resolved topic names for the four input streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTopics {
    pub image: String,
    pub camera_meta: String,
    pub pose: String,
    pub edge_sites: String,
}

impl StreamTopics {
    /// Resolve the image and calibration topics under the camera prefix.
    /// The tracker-side topics have fixed names.
    pub fn resolve(camera_prefix: &str) -> Result<Self> {
        ensure!(
            !camera_prefix.is_empty(),
            "camera prefix must not be empty; the tracker may not be \
             launched, or it runs in another namespace"
        );
        let prefix = camera_prefix.trim_end_matches('/');

        Ok(Self {
            image: format!("{prefix}/image_rect"),
            camera_meta: format!("{prefix}/camera_info"),
            pose: "object_position_covariance".to_string(),
            edge_sites: "moving_edge_sites".to_string(),
        })
    }

    pub fn get(&self, source: SourceId) -> &str {
        match source {
            SourceId::Image => &self.image,
            SourceId::CameraMeta => &self.camera_meta,
            SourceId::Pose => &self.pose,
            SourceId::EdgeSites => &self.edge_sites,
        }
    }

    pub fn all(&self) -> [(SourceId, &str); 4] {
        [
            (SourceId::Image, self.image.as_str()),
            (SourceId::CameraMeta, self.camera_meta.as_str()),
            (SourceId::Pose, self.pose.as_str()),
            (SourceId::EdgeSites, self.edge_sites.as_str()),
        ]
    }
}

/// Answers whether a topic currently has a live publisher. Implemented by
/// the transport integration.
pub trait Readiness {
    fn is_publishing(&mut self, topic: &str) -> bool;
}

/// Poll until every input stream is being published.
///
/// Returns early without error if shutdown is requested while waiting;
/// fails if the deadline expires first, which is fatal to startup.
pub async fn wait_for_streams(
    readiness: &mut dyn Readiness,
    topics: &StreamTopics,
    deadline: Duration,
    poll_period: Duration,
    shutdown: &ShutdownFlag,
) -> Result<()> {
    let start = Instant::now();

    loop {
        if shutdown.is_set() {
            return Ok(());
        }

        let missing: Vec<&str> = topics
            .all()
            .into_iter()
            .filter(|&(_source, topic)| !readiness.is_publishing(topic))
            .map(|(_source, topic)| topic)
            .collect();

        if missing.is_empty() {
            info!("all input streams are publishing");
            return Ok(());
        }

        if start.elapsed() >= deadline {
            bail!(
                "gave up waiting for publishers on: {}",
                missing.join(", ")
            );
        }

        warn!(missing = ?missing, "waiting for input streams to publish");
        tokio::time::sleep(poll_period).await;
    }
}
