//! Profile types and sync state

mod dob;
mod state;
mod types;

pub use dob::{format_dob, parse_dob, DobFormat};
pub use state::SyncState;
pub use types::*;
