//! syzygy-viewer - monitors the output of a remote tracking pipeline.
//!
//! The viewer consumes four asynchronous input streams — rectified image
//! frames, camera calibration metadata, pose-with-covariance estimates,
//! and moving-edge sites — aligns them with the approximate-time
//! synchronizer from [`syzygy_core`], and drives a fixed-rate render loop
//! that hands aligned frames with overlays to a display sink. A watchdog
//! audits the streams' arrival rates and reports degradation.
//!
//! Transport and display are trait seams: the message bus pushes into
//! per-stream [`StreamSenders`](viewer::StreamSenders) handles, and
//! rendering implementations plug in behind
//! [`DisplaySink`](sink::DisplaySink). This crate owns the driver in
//! between.

pub mod bootstrap;
pub mod config;
pub mod message;
pub mod sink;
pub mod telemetry;
pub mod view;
pub mod viewer;
