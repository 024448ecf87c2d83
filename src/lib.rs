//! Clipsplit - background video cutting service
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (segment planning, task records, ids)
//! - ports/: Trait definitions (cutter, prober, resolver, progress backend)
//! - adapters/: Concrete implementations (ffmpeg, local files, HTTP)
//! - application/: Job dispatch, execution and the shared progress store
//! - config: Environment configuration
//!
//! # Features
//! - `libav`: probe source durations through libav instead of the ffprobe binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::AppConfig;
pub use error::{JobError, JobResult, StoreError};
