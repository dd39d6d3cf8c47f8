//! Drawing prediction overlays onto frames.

pub mod overlay;

pub use overlay::OverlayRenderer;
