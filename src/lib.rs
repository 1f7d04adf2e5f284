//! mkvstrip library
//!
//! Decides which audio and subtitle tracks of a Matroska file to keep,
//! remove or extract, and turns that decision into a remux plan for
//! `mkvmerge` or an in-place cleanup plan for `mkvpropedit`.
//!
//! The core (`domain`, `planner`) is pure: it takes a probed [`MediaFile`]
//! and a [`Policy`] and returns an [`EditPlan`]. Probing, execution and
//! file handling live behind the traits in `ports`.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod planner;
pub mod ports;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{GeneralInfo, MediaFile, Track, TrackKind};
pub use domain::policy::Policy;
pub use error::{StripError, StripResult};
pub use planner::{CleanupPlan, EditPlan, PlanBuilder, PlanOptions, RemuxPlan, TrackEdit, TrackSet};
