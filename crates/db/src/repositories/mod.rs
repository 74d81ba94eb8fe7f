use async_trait::async_trait;
use thiserror::Error;

use trimscout_core::domain::{Variant, VariantId};
use trimscout_core::errors::ApplicationError;

pub mod memory;
pub mod variant;

pub use memory::InMemoryVariantRepository;
pub use variant::SqlVariantRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

#[async_trait]
pub trait VariantRepository: Send + Sync {
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>, RepositoryError>;

    async fn save(&self, variant: Variant) -> Result<(), RepositoryError>;

    /// Every stored variant, ordered by make, model, price and name.
    async fn list_all(&self) -> Result<Vec<Variant>, RepositoryError>;

    /// Swaps the stored catalog for `variants` in one step and returns how
    /// many were written.
    async fn replace_all(&self, variants: Vec<Variant>) -> Result<usize, RepositoryError>;
}
