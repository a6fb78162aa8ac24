//! Inference endpoint integration
//!
//! Low-level plumbing shared by the estimator, the goal generator and
//! the health coach: the HTTP client and the tolerant JSON extraction
//! applied to generated text.

pub mod client;
pub mod extract;

pub use client::{Content, InferenceClient, Part};
pub use extract::first_json_object;
