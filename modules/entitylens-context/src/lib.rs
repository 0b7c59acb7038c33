pub mod context;
pub mod resolution;

pub use context::ExecutionContext;
pub use resolution::{resolve_lens_id, LensIdSource};
