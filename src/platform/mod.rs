//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keys and the touch joystick, folded into one direction)
//! - Storage (LocalStorage on web, JSON files on native)

pub mod input;
pub mod storage;

pub use input::{JoystickInput, KeyState};
pub use storage::{BlobStore, MemoryStore, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
