pub mod material;
pub mod search;
pub mod sync;
