//! Kitchen label core: categories, expiry arithmetic and label history.
//!
//! Everything here is synchronous and free of I/O. The TUI and CLI in
//! `main` drive it through [`LabelSession`].

pub mod catalog;
pub mod error;
pub mod expiry;
pub mod history;
pub mod record;
pub mod session;

pub use catalog::{Catalog, CategoryRule};
pub use error::Result;
pub use expiry::{expiry_status, parse_production_date, ExpiryStatus};
pub use record::{LabelId, LabelRecord};
pub use session::LabelSession;
