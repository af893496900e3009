//! Error types for synthetic data generation.

pub type GenerationResult<T> = Result<T, GenerationError>;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Cannot sample {requested} stops from {available} distinct stations")]
    NotEnoughStations { requested: usize, available: usize },

    #[error("Invalid stop count distribution: {0}")]
    InvalidDistribution(String),

    #[error("At least one service frequency is required")]
    EmptyFrequencies,

    #[error("Could not produce a unique {what} after {attempts} attempts")]
    UniquenessExhausted { what: &'static str, attempts: usize },
}
