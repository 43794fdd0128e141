//! Filtered catalog query construction.
//!
//! Any subset of feature/tag/limit/offset may be supplied. Each supplied
//! constraint adds exactly one placeholder, so the statement stays well
//! formed when none are.

use bannerd_storage::BannerFilter;

/// Columns every banner read returns, in `BannerRow` order.
pub(crate) const BANNER_COLUMNS: &str = "b.id, b.feature_id, \
     ARRAY(SELECT bt.tag_id FROM banner_tags bt WHERE bt.banner_id = b.id ORDER BY bt.position) AS tag_ids, \
     b.content, b.is_active, b.created_at, b.updated_at";

/// SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<i64>,
}

/// Builds the admin listing query from a [`BannerFilter`].
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery {
    filter: BannerFilter,
}

impl CatalogQuery {
    pub fn new(filter: BannerFilter) -> Self {
        Self { filter }
    }

    pub fn build(&self) -> BuiltQuery {
        let mut params = Vec::new();
        let mut conditions = Vec::new();

        if let Some(feature_id) = self.filter.feature_id {
            params.push(feature_id);
            conditions.push(format!("b.feature_id = ${}", params.len()));
        }

        // Filtering on a separate alias keeps the full tag set in the result.
        if let Some(tag_id) = self.filter.tag_id {
            params.push(tag_id);
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM banner_tags f WHERE f.banner_id = b.id AND f.tag_id = ${})",
                params.len()
            ));
        }

        let mut sql = format!("SELECT {BANNER_COLUMNS} FROM banners b");
        if !self.filter.is_unfiltered() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY b.id");

        if let Some(limit) = self.filter.limit {
            params.push(i64::from(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = self.filter.offset {
            params.push(i64::from(offset));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }

        BuiltQuery { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfiltered() {
        let query = CatalogQuery::new(BannerFilter::new()).build();
        assert!(query.sql.ends_with("FROM banners b ORDER BY b.id"));
        assert!(!query.sql.contains("FROM banners b WHERE"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_feature_only() {
        let query = CatalogQuery::new(BannerFilter::new().with_feature(7)).build();
        assert!(query.sql.contains("WHERE b.feature_id = $1 ORDER BY b.id"));
        assert_eq!(query.params, vec![7]);
    }

    #[test]
    fn test_tag_only() {
        let query = CatalogQuery::new(BannerFilter::new().with_tag(3)).build();
        assert!(query.sql.contains("WHERE EXISTS"));
        assert!(query.sql.contains("f.tag_id = $1)"));
        assert_eq!(query.params, vec![3]);
    }

    #[test]
    fn test_all_constraints_numbered_in_order() {
        let filter = BannerFilter::new()
            .with_feature(7)
            .with_tag(3)
            .with_limit(10)
            .with_offset(20);
        let query = CatalogQuery::new(filter).build();

        assert!(query.sql.contains("b.feature_id = $1 AND EXISTS"));
        assert!(query.sql.contains("f.tag_id = $2)"));
        assert!(query.sql.ends_with("ORDER BY b.id LIMIT $3 OFFSET $4"));
        assert_eq!(query.params, vec![7, 3, 10, 20]);
    }

    #[test]
    fn test_offset_without_limit() {
        let query = CatalogQuery::new(BannerFilter::new().with_offset(5)).build();
        assert!(query.sql.ends_with("ORDER BY b.id OFFSET $1"));
        assert_eq!(query.params, vec![5]);
    }
}
