//!
//! Transaction data model, the chain's binary transaction encoding and the
//! digests derived from it (signature hashes, transaction id and hash).
//!

pub mod constants;
pub mod hashing;
pub mod subnets;
pub mod tx;

pub use kastx_hashes::Hash;
