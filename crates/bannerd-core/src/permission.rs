//! Banner visibility rules.
//!
//! "U may see feature F for tag T" holds iff U is an admin or owns T. The
//! feature never narrows access: tags are the only unit of ownership.

use crate::banner::{Banner, FeatureId, TagId};
use crate::user::{Caller, User};

/// Anything that can be checked against tag ownership.
pub trait Principal {
    fn is_admin(&self) -> bool;
    fn owns_tag(&self, tag_id: TagId) -> bool;
}

impl Principal for User {
    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn owns_tag(&self, tag_id: TagId) -> bool {
        self.tags.contains(&tag_id)
    }
}

impl Principal for Caller {
    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn owns_tag(&self, tag_id: TagId) -> bool {
        self.tags.contains(&tag_id)
    }
}

/// Returns `true` if `principal` may see the banner of `feature_id` for `tag_id`.
pub fn can_view<P: Principal + ?Sized>(principal: &P, _feature_id: FeatureId, tag_id: TagId) -> bool {
    principal.is_admin() || principal.owns_tag(tag_id)
}

/// Inactive banners are hidden from everyone but admins.
pub fn is_visible<P: Principal + ?Sized>(principal: &P, banner: &Banner) -> bool {
    banner.is_active || principal.is_admin()
}
