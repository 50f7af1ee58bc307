//! Core trait definitions

pub mod sync;

#[cfg(feature = "pico2_w")]
pub use sync::EmbassyState;
pub use sync::{MockState, SharedState};
