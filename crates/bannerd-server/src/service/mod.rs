//! Banner retrieval and catalog management, plus the cache synchronizer.

pub mod banner;
pub mod error;
pub mod sync;

pub use banner::BannerService;
pub use error::{ErrorKind, ServiceError};
pub use sync::{CacheSynchronizer, SweepReport, SyncHandle};
