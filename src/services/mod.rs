pub use errors::{ServiceError, ServiceResult};

pub mod errors;
pub mod search;
pub mod sync;
pub mod watch;
