//! Core types for pathbot
//!
//! Domain types, the progress engine and the usage metrics aggregator.
//! Nothing in this crate performs I/O.

#![allow(clippy::module_name_repetitions, reason = "Domain types are named after their module")]

pub mod constants;
pub mod curriculum;
pub mod env_config;
mod error;
pub mod member;
pub mod navigation;
pub mod progress;
pub mod survey;
pub mod usage;

pub use curriculum::*;
pub use error::*;
pub use member::*;
pub use navigation::*;
pub use progress::*;
pub use survey::*;
pub use usage::*;
