// Storm event impact ranking: load storm records, map free-text event
// labels onto the official event classes, decode damage magnitudes and
// rank classes by casualties and by economic damage.
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod magnitude;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod taxonomy;
pub mod types;
pub mod util;

pub use error::{Result, StormError};
