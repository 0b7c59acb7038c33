pub mod entity;
pub mod error;
pub mod hash;
pub mod payload;
pub mod primitives;
pub mod request;

pub use entity::{CanonicalDimension, Entity, EntityClass, ExtractedEntity, ModuleMap};
pub use error::{EngineError, ErrorKind};
pub use hash::{canonical_json_hash, content_hash_hex};
pub use payload::RawPayload;
pub use primitives::{is_primitive_key, Primitives, PRIMITIVE_SET};
pub use request::{IngestMode, IngestRequest, QueryFeatures};
