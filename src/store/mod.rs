//! Persistence for tasks, memos and preferences.
//!
//! Each is a small JSON document under the tasktrack home directory.

pub mod memos;
pub mod preferences;
pub mod tasks;

pub use memos::{MemoList, MemoStore};
pub use preferences::{JsonPreferencesStore, PreferencesStore};
pub use tasks::{TaskList, TaskStore};
