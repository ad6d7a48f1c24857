pub mod snapshot;

pub use snapshot::{handle_category_command, handle_snapshot_command};
