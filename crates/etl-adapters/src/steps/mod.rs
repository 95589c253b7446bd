//! Variantes concretas del contrato `Step`.
pub mod data;
pub mod etag;
pub mod snapshot;

pub use data::DataStep;
pub use etag::EtagStep;
pub use snapshot::SnapshotStep;
