//! Auditory and visual stimulus generation.

pub mod audio;
pub mod video;
