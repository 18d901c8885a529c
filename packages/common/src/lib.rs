pub mod config;
pub mod key;
pub mod mime;
pub mod storage;

pub use key::{DeployKey, KeyError};
