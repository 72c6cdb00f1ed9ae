//! Progress persistence: the settings source the coordinator reads its toggles from

mod badges;
mod store;
#[cfg(test)]
mod tests;

pub use badges::{find_badge, is_known_badge, Badge, ALL_BADGES};
pub use store::{Progress, ProgressError, ProgressStore, ProgressUpdate};
