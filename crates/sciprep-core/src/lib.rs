//! sciprep-core — Quiz sessions, progress, and navigation.
//!
//! This crate defines the data model, the gateway traits, and the pure
//! state machines that the sciprep front end drives: the quiz session
//! controller, the progress aggregator, the mastery-map policy, and the
//! view-navigation reducer.

pub mod catalog;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod mastery_map;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod session;
pub mod traits;
