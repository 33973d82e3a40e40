//! exgrade-core — grading engine for interactive document exercises.
//!
//! This crate defines the data model, answer matching, feedback state
//! machine, and score aggregation that the exgrade CLI and embedding
//! hosts build on. The host view layer forwards typed events into
//! [`engine::GradingEngine`] and renders whatever comes back; nothing in
//! here touches a document tree.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod score;
pub mod state;
