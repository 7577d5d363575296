//! Core library for the chart generator.
//!
//! The crate turns timing features extracted from a song (beats, onsets and an
//! energy envelope) into a rhythm game note chart. Generation runs as a one
//! way pipeline: [`filter`] picks candidate times, [`lanes`] spreads them over
//! the keys, [`holds`] stretches some taps into holds and [`scoring`] rates the
//! result. [`generator`] sequences the stages and can re-roll a single window
//! of an existing chart without disturbing the rest.
//!
//! Every stochastic call takes its pseudorandom stream by mutable reference,
//! so a seeded stream from [`rng::create_rng`] makes generation reproducible.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod holds;
pub mod lanes;
pub mod profile;
pub mod rng;
pub mod scoring;

pub use analysis::{AnalysisInput, EnergyEnvelope};
pub use chart::{ChartMetadata, Note, NoteChart};
pub use config::{AppConfig, GeneratorConfig};
pub use error::{ChartError, Result};
pub use generator::{generate, regenerate_section, ChartGenerator};
pub use profile::{DifficultyLevel, DifficultyProfile};
pub use scoring::score_difficulty;
