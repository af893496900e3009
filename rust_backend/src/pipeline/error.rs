use std::path::PathBuf;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::generation::GenerationError;
use crate::simulation::SimulationError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("Minute ridership does not add up to the hourly source in {count} (hour, station) pairs")]
    Inconsistent { count: usize },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
