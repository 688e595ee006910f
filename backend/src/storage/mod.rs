//! Persistence adapters used by the report subsystem.
//!
//! - `database`: opens the SQLite file and creates the `events` and `reports`
//!   tables when they are missing.
//! - `media`: read-only access to uploaded event photos.
//! - `artifacts`: where generated `.docx` files are written and read back.

pub mod artifacts;
pub mod database;
pub mod media;
