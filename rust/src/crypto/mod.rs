//! Cryptography for stored credentials: cost factor normalization, pepper
//! handling, and the bcrypt hash/verify/rehash operations.

pub mod cost;
pub mod passwords;
pub mod pepper;
