//! etl-store: content store para los archivos crudos de los snapshots.
//!
//! Define el contrato (`ContentStore`), los dos canales remotos y el formato
//! del registro de tracking, más una implementación sobre filesystem.
pub mod config;
pub mod error;
pub mod local;
pub mod remote;
pub mod store;
pub mod tracking;

pub use config::StoreConfig;
pub use error::StoreError;
pub use local::LocalObjectStore;
pub use remote::Remote;
pub use store::ContentStore;
pub use tracking::TrackedOutput;
