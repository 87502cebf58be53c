//! Writing-voice model: the persisted style guide, corpus statistics and the
//! lockable store that guards every write.

pub mod analysis;
pub mod guide;
pub mod store;

pub use analysis::analyze_posts;
pub use guide::{DerivedStats, ExampleFragment, PlatformRules, PlatformStats, StyleGuide, StylePolicy};
pub use store::StyleStore;
