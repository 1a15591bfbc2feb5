use thiserror::Error;

/// Reasons a weight vector cannot be turned into a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidWeight {
    #[error("weight {value} at index {index} is negative")]
    Negative { index: usize, value: f32 },

    #[error("weight {value} at index {index} is not finite")]
    NonFinite { index: usize, value: f32 },

    #[error("weights sum to zero")]
    ZeroSum
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SamplerError {
    #[error("cannot sample from an empty distribution")]
    EmptyDistribution,

    #[error("invalid weight: {0}")]
    InvalidWeight(#[from] InvalidWeight)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalkError {
    #[error("depth ({depth}) and draws ({draws}) must both be at least 1")]
    InvalidConfig { depth: usize, draws: usize },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("invalid item weight")]
    InvalidItemWeight(#[source] InvalidWeight),

    #[error("item {item} is out of range, only {num_items} items have a weight")]
    IndexOutOfRange { item: usize, num_items: usize },

    #[error("cannot initialize the item sampler of user {user}")]
    SamplerInitFailed {
        user: usize,
        #[source]
        source: SamplerError
    },

    #[error("empty query")]
    EmptyQuery,

    #[error("invalid query")]
    InvalidQuery(#[source] SamplerError),

    #[error("no valid seeds, no one has interacted with the queried items")]
    NoValidSeeds,

    #[error("no one has interacted with item {0}")]
    OrphanItem(usize)
}
