//! The render loop driver.

use crate::{
    bootstrap::StreamTopics,
    config::ViewerConfig,
    message::{SourceId, StreamMessage},
    sink::{DisplaySink, HealthSink, RenderFrame},
    view::ViewState,
};
use eyre::Result;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use syzygy_core::{Inbox, SourceSender, Synchronizer, Watchdog};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

/// Cooperative shutdown flag shared between the driver and the embedding
/// process. Polled at every loop iteration and inside every startup wait.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-stream sender handles given to the transport layer.
///
/// Sends never block; the driver drains them between render iterations.
#[derive(Debug, Clone)]
pub struct StreamSenders {
    pub image: SourceSender<SourceId, StreamMessage>,
    pub camera_meta: SourceSender<SourceId, StreamMessage>,
    pub pose: SourceSender<SourceId, StreamMessage>,
    pub edge_sites: SourceSender<SourceId, StreamMessage>,
}

/// The viewer driver.
///
/// Owns the transport inbox, the synchronizer, the watchdog, and the view
/// state, and runs all of them from one cooperative loop: drain pending
/// messages (each delivery may emit a tuple), fold tuples into the view,
/// hand the view to the display sink, and audit stream health on its own
/// period. Rendering errors are logged and the loop continues with stale
/// data; only shutdown stops it.
pub struct Viewer<D, H>
where
    D: DisplaySink,
    H: HealthSink,
{
    inbox: Inbox<SourceId, StreamMessage>,
    sync: Synchronizer<SourceId, StreamMessage>,
    watchdog: Watchdog<SourceId>,
    state: ViewState,
    topics: StreamTopics,
    sink: D,
    health: H,
    shutdown: ShutdownFlag,
    frame_period: Duration,
}

impl<D, H> Viewer<D, H>
where
    D: DisplaySink,
    H: HealthSink,
{
    pub fn new(config: &ViewerConfig, sink: D, health: H, shutdown: ShutdownFlag) -> Result<Self> {
        let topics = StreamTopics::resolve(&config.camera_prefix)?;
        let sync = Synchronizer::new(SourceId::ALL, &config.sync_config())?;
        let watchdog = Watchdog::new(config.watchdog_config());

        Ok(Self {
            inbox: Inbox::new(),
            sync,
            watchdog,
            state: ViewState::new(),
            topics,
            sink,
            health,
            shutdown,
            frame_period: config.frame_period(),
        })
    }

    pub fn topics(&self) -> &StreamTopics {
        &self.topics
    }

    /// Create the sender handles the transport layer delivers into.
    pub fn senders(&self) -> StreamSenders {
        StreamSenders {
            image: self.inbox.sender(SourceId::Image),
            camera_meta: self.inbox.sender(SourceId::CameraMeta),
            pose: self.inbox.sender(SourceId::Pose),
            edge_sites: self.inbox.sender(SourceId::EdgeSites),
        }
    }

    /// Run the render loop until shutdown is requested.
    pub async fn run(mut self) -> Result<()> {
        info!(
            frame_period = ?self.frame_period,
            audit_period = ?self.watchdog.period(),
            camera_topic = %self.topics.image,
            "starting render loop"
        );

        let mut frame_tick = time::interval(self.frame_period);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first audit belongs one full period from now; an immediate
        // tick would judge an empty period.
        let mut audit_tick = time::interval_at(
            time::Instant::now() + self.watchdog.period(),
            self.watchdog.period(),
        );
        audit_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if self.shutdown.is_set() {
                break;
            }

            tokio::select! {
                _ = frame_tick.tick() => {
                    self.pump();
                    self.render();
                }
                _ = audit_tick.tick() => {
                    self.audit();
                }
            }
        }

        info!("render loop stopped");
        Ok(())
    }

    /// Drain pending transport messages into the synchronizer and fold
    /// any emitted tuples into the view.
    fn pump(&mut self) {
        for (source, msg) in self.inbox.drain() {
            if let Some(tuple) = self.sync.push(&source, msg) {
                self.state.apply(tuple);
            }
        }
    }

    /// Hand the current view to the display sink.
    fn render(&mut self) {
        let result = match self.state.image() {
            Some(image) => {
                let overlay = self.state.overlay(self.topics.get(SourceId::Image));
                self.sink.render(&RenderFrame { image, overlay })
            }
            None => self.sink.awaiting(),
        };

        if let Err(err) = result {
            error!(error = %err, "display sink failed; continuing with stale view");
        }
    }

    /// Sample the synchronizer counters and surface the health report.
    fn audit(&mut self) {
        let report = self.watchdog.audit(&self.sync.counters());
        self.health.report(&report);
    }
}
