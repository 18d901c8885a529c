mod error;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemObjectStore;
pub use traits::{ObjectStore, StoredObject};
