//! Item recommendations from random walks on a user/item bipartite graph.
//!
//! Walks start from items sampled out of a query and alternate between a
//! user who interacted with the current item and an item from that user's
//! collection.  Both choices are biased by item weight through alias
//! samplers built once when the [`Walker`] is created.
pub mod error;
pub mod sampler;
pub mod graph;
pub mod walker;
pub mod batch;
pub mod utils;

pub use crate::error::{InvalidWeight, SamplerError, WalkError};
pub use crate::sampler::AliasSampler;
pub use crate::walker::{Config, HopMode, QueryItem, Walk, Walker};
