//! Item-item collaborative filtering for implicit feedback.
//!
//! Interaction logs (a user and the set of items it touched) are turned into per-item
//! neighbor lists, either by cosine similarity over the sparse co-occurrence matrix or by
//! Jaccard similarity over counted item pairs. Every user then gets a fixed-length list
//! of unseen items, topped up from global popularity when the neighborhoods run dry.

pub mod config;
pub mod config_processors;
pub mod error;
pub mod interactions;
pub mod io;
pub mod itemknn;
pub mod metrics;
pub mod stopwatch;
