//! Outbound seams: the display sink and the health report sink.
//!
//! Actual rendering lives outside this crate; the viewer only prepares
//! frames and overlays and hands them over.

use crate::{
    message::{ImageFrame, SourceId},
    view::Overlay,
};
use eyre::Result;
use syzygy_core::HealthReport;
use tracing::{debug, trace, warn};

/// One fully prepared frame handed to the display.
#[derive(Debug)]
pub struct RenderFrame<'a> {
    pub image: &'a ImageFrame,
    pub overlay: Overlay,
}

/// Accepts prepared frames for display.
///
/// Implementations must not block for long; the render loop calls them
/// from its single cooperative thread. Errors are logged by the caller
/// and never stop the loop.
pub trait DisplaySink {
    /// Present a time-aligned frame with its overlays.
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()>;

    /// No aligned tuple exists yet; show a placeholder.
    fn awaiting(&mut self) -> Result<()>;
}

/// Display sink that logs what would be drawn.
#[derive(Debug, Default)]
pub struct TracingSink {
    frames: u64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for TracingSink {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
        self.frames += 1;
        debug!(
            frame = self.frames,
            width = frame.image.width,
            height = frame.image.height,
            status = %frame.overlay.status_line,
            markers = frame.overlay.markers.len(),
            "render"
        );
        Ok(())
    }

    fn awaiting(&mut self) -> Result<()> {
        trace!("awaiting alignment");
        Ok(())
    }
}

/// Receives the watchdog's periodic report.
pub trait HealthSink {
    fn report(&mut self, report: &HealthReport<SourceId>);
}

/// Surfaces health reports as log lines.
#[derive(Debug, Default)]
pub struct LogHealthSink;

impl LogHealthSink {
    pub fn new() -> Self {
        Self
    }
}

impl HealthSink for LogHealthSink {
    fn report(&mut self, report: &HealthReport<SourceId>) {
        if report.is_degraded() {
            let counts: Vec<String> = report
                .arrivals
                .iter()
                .map(|(source, count)| format!("{source}: {count}"))
                .collect();
            let degraded: Vec<&str> = report.degraded.iter().map(|source| source.label()).collect();
            warn!(
                "Low number of synchronized tuples received.\n{}\nSynchronized tuples: {}\n\
                 Degraded streams: {}\nPossible issues:\n\t* The network is too slow.",
                counts.join("\n"),
                report.emitted,
                degraded.join(", ")
            );
        } else {
            debug!(
                emitted = report.emitted,
                threshold = report.threshold,
                "input streams healthy"
            );
        }
    }
}
