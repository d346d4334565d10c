//! Hashed bag-of-words feature extraction.

mod hashing;
mod sparse;

pub use hashing::{HashingVectorizer, Norm};
pub use sparse::SparseVector;
