// Library surface for the trainer core and integration tests.
// The binary in main.rs is a thin CLI over these modules.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod lookup;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use store::{NewWord, VocabDb, Word, WordId};
