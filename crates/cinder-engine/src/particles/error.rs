use thiserror::Error;

/// Emitter configuration rejected before any state is allocated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("emitter capacity must be at least 1")]
    ZeroCapacity,

    #[error("emitter capacity {capacity} exceeds the maximum of {max} particles")]
    CapacityTooLarge { capacity: usize, max: usize },

    #[error("spawn rate must be a positive, finite number of particles per second (got {0})")]
    InvalidSpawnRate(f32),

    #[error("particle lifetime must be a positive, finite number of seconds (got {0})")]
    InvalidLifetime(f32),
}

/// Failure to construct a GPU-backed emitter.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{what} needs {required} bytes but the device allows at most {limit}")]
    BufferTooLarge {
        what: &'static str,
        required: u64,
        limit: u64,
    },
}
