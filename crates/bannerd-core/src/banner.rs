//! Banner records and the inputs used to create and patch them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{CoreError, Result};

pub type BannerId = i64;
pub type FeatureId = i64;
pub type TagId = i64;

/// Opaque banner payload. Always a JSON object.
pub type BannerContent = serde_json::Map<String, serde_json::Value>;

/// A stored banner.
///
/// `tag_ids` keeps the order in which the tags were supplied; storage treats
/// the set as unordered but hands it back in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "banner_id")]
    pub id: BannerId,
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Banner {
    /// Returns `true` if the banner targets the given tag.
    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tag_ids.contains(&tag_id)
    }

    /// Applies a patch in place. Absent fields are left untouched.
    pub fn apply(&mut self, patch: &BannerPatch, updated_at: OffsetDateTime) {
        if let Some(feature_id) = patch.feature_id {
            self.feature_id = feature_id;
        }
        if let Some(ref tag_ids) = patch.tag_ids {
            self.tag_ids = tag_ids.clone();
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = updated_at;
    }
}

/// Fields required to create a banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBanner {
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
}

impl NewBanner {
    pub fn validate(&self) -> Result<()> {
        validate_feature_id(self.feature_id)?;
        validate_tag_ids(&self.tag_ids)
    }
}

/// Partial update of a banner.
///
/// Every field is optional: `None` means the field was not supplied and must
/// not be touched, which keeps `is_active: Some(false)` distinct from "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<FeatureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<TagId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BannerContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl BannerPatch {
    /// Returns `true` when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.feature_id.is_none()
            && self.tag_ids.is_none()
            && self.content.is_none()
            && self.is_active.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(feature_id) = self.feature_id {
            validate_feature_id(feature_id)?;
        }
        if let Some(ref tag_ids) = self.tag_ids {
            validate_tag_ids(tag_ids)?;
        }
        Ok(())
    }
}

fn validate_feature_id(feature_id: FeatureId) -> Result<()> {
    if feature_id <= 0 {
        return Err(CoreError::invalid_banner(format!(
            "feature_id must be positive, got {feature_id}"
        )));
    }
    Ok(())
}

fn validate_tag_ids(tag_ids: &[TagId]) -> Result<()> {
    if tag_ids.is_empty() {
        return Err(CoreError::invalid_banner("tag_ids must not be empty"));
    }
    let mut seen = HashSet::with_capacity(tag_ids.len());
    for &tag_id in tag_ids {
        if tag_id <= 0 {
            return Err(CoreError::invalid_banner(format!(
                "tag_ids must be positive, got {tag_id}"
            )));
        }
        if !seen.insert(tag_id) {
            return Err(CoreError::invalid_banner(format!(
                "tag_ids contains duplicate tag {tag_id}"
            )));
        }
    }
    Ok(())
}
