//! lumen-pipeline: single-slider photo filters (sans-IO).
//!
//! Applies one of a fixed set of filters to an in-memory image, driven by
//! a single intensity value in `[0, 1]`:
//! catalog -> parameter mapping -> render engine.
//!
//! The entry point is [`FilterPipeline::apply`], a total function: bad
//! input or an engine failure returns the input image unchanged rather
//! than an error. This crate has **no I/O dependencies**; decoding and
//! encoding work on byte slices and all filesystem interaction lives in
//! the `lumen` binary.

pub mod blur;
pub mod catalog;
pub mod color;
pub mod context;
pub mod engine;
pub mod exchange;
pub mod params;
pub mod pipeline;
pub mod types;
pub mod vignette;

pub use catalog::{FilterVariant, UnknownFilter};
pub use context::{ContextStats, RenderContext};
pub use engine::{BoundOperation, Operation, Recipe, RenderEngine};
pub use exchange::{ExchangeImage, Orientation, PixelLayout};
pub use params::{ParameterSet, map_parameters};
pub use pipeline::FilterPipeline;
pub use types::{
    ContextOptions, Dimensions, ExchangeError, Intensity, RenderError, RenderResult,
};
