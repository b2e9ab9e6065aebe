//! sc-engine: rendering-value pipeline for SpectraScope
//!
//! Turns analyzer magnitudes into display values: the per-pixel spectrum
//! line, the waterfall image, marker overlays and stable peak labels.
//! Presentation (actually painting pixels) stays with the host; this crate
//! only produces bytes and positions.
//!
//! ## Modules
//! - `axis` - linear/log frequency axis mapping
//! - `line` - per-pixel render-line builder (mask, smoothing, auto gain)
//! - `waterfall` - color map, live scroll accumulator, offline range scan
//! - `marker` - marker + harmonic overlay positions
//! - `engine` - facade owning all per-session state and mode dispatch

pub mod axis;
pub mod engine;
pub mod line;
pub mod marker;
pub mod waterfall;

pub use engine::{LiveFrame, SpectrumEngine, TickOutput};
