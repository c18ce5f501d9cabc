// src/constants.rs
//
// Application-wide constants.
// Each constant is documented with its purpose and usage context.

/// Quiet period in milliseconds before a pending save is issued.
///
/// Every change notification restarts the period, so a burst of keystrokes
/// results in a single save.
///
/// Used in: `application/autosave.rs`, `infrastructure/config.rs`
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Maximum number of undo steps kept per editing session.
///
/// Used in: `application/history.rs`
pub const HISTORY_DEPTH: usize = 100;

/// Buffered save events per subscriber before old events are dropped.
///
/// Used in: `application/autosave.rs`
pub const SAVE_EVENT_CAPACITY: usize = 64;

/// Directory name below the platform data directory holding note files.
///
/// Used in: `infrastructure/config.rs`
pub const STORE_DIR_NAME: &str = "notedit";

/// Config file name below the platform config directory.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_FILE_NAME: &str = "notedit.toml";

/// Extension of note files written by the file store.
///
/// Used in: `infrastructure/file_store.rs`
pub const NOTE_FILE_EXTENSION: &str = "json";

/// Route prefix of the notes API.
///
/// Used in: `infrastructure/http_store.rs`
pub const NOTES_API_PATH: &str = "api/notes";
