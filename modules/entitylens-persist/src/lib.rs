pub mod coordinator;
pub mod quarantine;
pub mod row;
pub mod slug;

pub use coordinator::{PersistenceCoordinator, PostgresCoordinator};
pub use quarantine::FailedExtraction;
pub use slug::derive_slug;
