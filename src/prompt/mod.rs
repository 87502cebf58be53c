mod builder;
pub mod composer;
mod engine;

pub use builder::{build_proofread_prompt, build_summary_prompt};
pub use composer::{ComposedPrompt, FACT_PLACEHOLDER, VARIANT_SEPARATOR, compose, effective_max_chars};
pub use engine::TeraEngine;
