pub mod config;
pub mod material;
pub mod saved_search;
pub mod sync;
pub mod system_event;
