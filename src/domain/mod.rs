//! Domain entities and value objects.

pub mod material;
pub mod saved_search;
pub mod sync;
pub mod system_event;
pub mod types;
