//! Step-gated tutorial walkthroughs.
//!
//! A [`Walkthrough`] sequences [`Step`]s, each gated by pluggable
//! [`Trigger`](triggers::Trigger)s that poll handles in a [`Scene`](scene::Scene).
//! The host ticks the walkthrough and requests navigation; observers are told
//! whenever it may have changed.

pub mod app;
pub mod clock;
pub mod config;
pub mod definition;
pub mod error;
pub mod logging;
pub mod runner;
pub mod scene;
pub mod spatial;
pub mod triggers;
pub mod ui;
pub mod walkthrough;

pub use error::DefinitionError;
pub use walkthrough::{Step, StepCompletion, Walkthrough, WalkthroughBuilder};
