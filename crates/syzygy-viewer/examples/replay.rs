//! Drives the viewer with synthetic tracker output.
//!
//! Stands in for the external transport layer: four streams publish at
//! 30fps with small per-stream offsets while the pose orbits the target.
//! Rendered frames and health reports go to the log.
//!
//! Run with: cargo run --example replay -p syzygy-viewer

use eyre::Result;
use std::time::Duration;
use syzygy_viewer::{
    config::ViewerConfig,
    message::{
        CameraMeta, EdgeSite, EdgeSiteList, EdgeState, ImageFrame, PoseEstimate, StreamMessage,
    },
    sink::{LogHealthSink, TracingSink},
    telemetry,
    viewer::{ShutdownFlag, Viewer},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init()?;

    let config = ViewerConfig::from_yaml(
        "camera_prefix: /camera\n\
         sync:\n  tolerance: 20ms\n\
         watchdog:\n  period: 2s\n",
    )?;

    let shutdown = ShutdownFlag::new();
    let viewer = Viewer::new(
        &config,
        TracingSink::new(),
        LogHealthSink::new(),
        shutdown.clone(),
    )?;
    let senders = viewer.senders();
    let viewer_handle = tokio::spawn(viewer.run());

    let feeder = tokio::spawn(async move {
        for i in 0..300u64 {
            let ts = |offset: u64| Duration::from_millis(i * 33 + offset);
            let angle = i as f64 * 0.05;

            senders.image.send(StreamMessage::image(
                ts(0),
                ImageFrame::new(640, 480, vec![0; 640 * 480]),
            ));
            senders.camera_meta.send(StreamMessage::camera_meta(
                ts(1),
                CameraMeta {
                    frame_id: "camera".to_string(),
                    focal: (600.0, 600.0),
                    principal_point: (320.0, 240.0),
                },
            ));
            senders.pose.send(StreamMessage::pose(
                ts(2),
                PoseEstimate::new(
                    [angle.cos() * 0.2, angle.sin() * 0.2, 0.5],
                    [0.0, 0.0, 0.0, 1.0],
                ),
            ));
            senders.edge_sites.send(StreamMessage::edge_sites(
                ts(3),
                EdgeSiteList {
                    sites: vec![EdgeSite {
                        x: 320.0 + angle.cos() * 40.0,
                        y: 240.0 + angle.sin() * 40.0,
                        state: EdgeState::Tracked,
                    }],
                },
            ));

            tokio::time::sleep(Duration::from_millis(33)).await;
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
        _ = feeder => info!("replay finished"),
    }

    shutdown.set();
    viewer_handle.await??;
    Ok(())
}
