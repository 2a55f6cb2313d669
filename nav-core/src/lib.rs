//! Service-navigation facade for a set-top-box media platform
//!
//! This crate decides which service is currently "playing". It mediates zap
//! requests against parental control, stream-relay substitution,
//! CI-alternative selection and tuner-priority preferences, sequences record
//! start/stop, and republishes the playback engine's lifecycle events. The
//! engine itself (tuning, demuxing, decoding, recording) sits behind the
//! [`nav_backend::PlaybackBackend`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use nav_core::{Navigation, NavigationConfig, PlayOutcome};
//!
//! let navigation = Navigation::builder(backend, scheduler)
//!     .config(NavigationConfig::default())
//!     .parental_control(parental)
//!     .stream_relay(relay)
//!     .build()?;
//!
//! let outcome = navigation.play(Some(reference));
//! assert_eq!(outcome, PlayOutcome::Started);
//!
//! // Engine events come back through the facade:
//! navigation.events().subscribe_playback(|event| println!("{event:?}"));
//! ```
//!
//! All operations run on one control thread; deferred retries re-enter
//! through [`Navigation::run_deferred`] from the owning event loop.

mod config;
mod error;
mod navigation;
mod recording;
mod resolve;
mod startup;
mod state;

pub mod logging;

pub use config::{NavigationConfig, StartupToStandby, TunerPriorityConfig, WakeupTimeType};
pub use error::{NavError, Result};
pub use navigation::{Navigation, NavigationBuilder, PlayOutcome};
pub use resolve::{resolve_group, resolve_group_ignoring_previous};

// Re-export the contract crates so embedders need only one dependency.
pub use nav_backend as backend;
pub use nav_events as events;
pub use nav_reference as reference;
