//! bcrypt credential hashing with cost normalization, an optional server-side
//! pepper, and rehash detection so stored hashes can be upgraded on login.

pub mod config;
pub mod crypto;
pub mod logging;

pub use config::{load_config, ConfigError, HasherConfig};
pub use crypto::cost::CostFactor;
pub use crypto::passwords::{CredentialHasher, EncodedHash, HashError};
pub use crypto::pepper::Pepper;
