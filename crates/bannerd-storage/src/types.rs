//! Query types for catalog listing.

use bannerd_core::{FeatureId, TagId};
use serde::{Deserialize, Serialize};

/// Filter for listing the banner catalog.
///
/// Every field is optional and an absent field imposes no constraint.
/// Results are ordered by banner id ascending so that `limit`/`offset`
/// pagination is stable across calls on an unmodified catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerFilter {
    #[serde(default)]
    pub feature_id: Option<FeatureId>,
    #[serde(default)]
    pub tag_id: Option<TagId>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl BannerFilter {
    /// An unconstrained filter: the whole catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_feature(mut self, feature_id: FeatureId) -> Self {
        self.feature_id = Some(feature_id);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag_id: TagId) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns `true` if neither feature nor tag narrows the result.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.feature_id.is_none() && self.tag_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let filter = BannerFilter::new().with_feature(7).with_limit(2).with_offset(4);
        assert_eq!(filter.feature_id, Some(7));
        assert_eq!(filter.tag_id, None);
        assert_eq!(filter.limit, Some(2));
        assert_eq!(filter.offset, Some(4));
        assert!(!filter.is_unfiltered());
        assert!(BannerFilter::new().with_limit(1).is_unfiltered());
    }
}
