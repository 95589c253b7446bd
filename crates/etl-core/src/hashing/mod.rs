//! Hashing: fingerprints de archivos y de conjuntos de checksums.

pub mod hash;

pub use hash::{checksum_file, fingerprint, hash_str};
