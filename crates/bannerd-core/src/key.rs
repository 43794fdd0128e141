//! Read-cache addressing.
//!
//! A banner with N tags is published under N keys, one per `(feature, tag)`
//! pair, so the cache is addressed by the pair a user asks for rather than by
//! banner id.

use std::fmt;
use std::str::FromStr;

use crate::banner::{FeatureId, TagId};
use crate::error::CoreError;

const PREFIX: &str = "banner";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BannerKey {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
}

impl BannerKey {
    pub fn new(feature_id: FeatureId, tag_id: TagId) -> Self {
        Self { feature_id, tag_id }
    }
}

impl fmt::Display for BannerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}:{}:{}", self.feature_id, self.tag_id)
    }
}

impl FromStr for BannerKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(PREFIX), Some(feature), Some(tag), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CoreError::invalid_key(s));
        };

        let feature_id = feature
            .parse::<FeatureId>()
            .map_err(|_| CoreError::invalid_key(s))?;
        let tag_id = tag.parse::<TagId>().map_err(|_| CoreError::invalid_key(s))?;

        let key = Self::new(feature_id, tag_id);
        // Reject non-canonical spellings such as "+7" or "007".
        if key.to_string() != s {
            return Err(CoreError::invalid_key(s));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(BannerKey::new(7, 3).to_string(), "banner:7:3");
    }

    #[test]
    fn test_key_parse() {
        let key: BannerKey = "banner:7:3".parse().unwrap();
        assert_eq!(key, BannerKey::new(7, 3));

        for bad in ["", "banner:7", "banner:7:3:1", "flag:7:3", "banner:x:3", "banner:07:3"] {
            assert!(bad.parse::<BannerKey>().is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_distinct_pairs_do_not_collide() {
        // Pairs whose naive concatenation would be identical.
        let a = BannerKey::new(1, 23).to_string();
        let b = BannerKey::new(12, 3).to_string();
        assert_ne!(a, b);
    }
}
