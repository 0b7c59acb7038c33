pub mod contract;
pub mod registry;
pub mod spec;

#[cfg(feature = "test-support")]
pub mod mock;

pub use contract::Connector;
pub use registry::ConnectorRegistry;
pub use spec::{ConnectorSpec, Phase};
