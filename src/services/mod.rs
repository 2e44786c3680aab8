pub mod atomic;
pub mod encoding;
pub mod locale;
pub mod lookup;
pub mod merge;
pub mod pipeline;
pub mod project;
pub mod qa;
pub mod rebuild;
pub mod stats;
pub mod translation_memory;
