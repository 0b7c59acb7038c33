pub mod features;
pub mod plan;

pub use features::derive_features;
pub use plan::{plan, DependencyEdge, ExecutionPlan};
