#[cfg(feature = "charts")]
pub mod charts;
pub mod error;
pub mod saver;
