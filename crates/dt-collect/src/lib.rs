//! Collection barrier: N independent collectors, one release.
//!
//! Collectors append records concurrently and never wait on each
//! other; the pairing step suspends in [`CollectionRegistry::await_all`]
//! until every registered collector has signaled completion.

pub mod registry;
pub mod source;

pub use registry::{CollectionRegistry, CollectorHandle, SourceBuffer};
pub use source::{ChapterSource, StaticSource};
