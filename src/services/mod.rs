pub mod digest_engine;
pub mod pipeline;

pub use digest_engine::DigestEngine;
pub use pipeline::{PipelineService, Stage};
