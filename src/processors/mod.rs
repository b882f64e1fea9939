// pixel-lift/src/processors/mod.rs
mod compressor;
mod discovery;
pub mod enhance;
mod loader;
pub mod pipeline;
mod resizer;

pub use compressor::{flatten_on_white, Compressor, Effort};
pub use discovery::{cleanup_temp_dirs, discover, Discoverer, Discovery, DiscoveryOptions};
pub use loader::Loader;
pub use resizer::{predict_dimensions, Resizer};
