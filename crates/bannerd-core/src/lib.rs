pub mod banner;
pub mod error;
pub mod key;
pub mod permission;
pub mod user;

pub use banner::{Banner, BannerContent, BannerId, BannerPatch, FeatureId, NewBanner, TagId};
pub use error::{CoreError, Result};
pub use key::BannerKey;
pub use permission::{Principal, can_view, is_visible};
pub use user::{Caller, User};

/// Current UTC time, used for banner creation and update timestamps.
pub fn now_utc() -> time::OffsetDateTime {
    time::OffsetDateTime::now_utc()
}
