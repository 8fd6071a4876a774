//! State management for the slideshow pager.

pub mod sequence;
pub mod window;

pub use sequence::{NodeSequence, OrderMode, Slide};
pub use window::{BatchId, LoadState, Slot, WindowPlan, WindowPolicy, loaded_tail};
