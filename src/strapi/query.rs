//! Strapi query string builder
//!
//! Encodes `filters[...]`, `populate`, `sort` and `pagination` parameters the
//! way the Strapi REST API expects them.

/// Filter operators used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    ContainsI,
}

impl FilterOp {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::ContainsI => "$containsi",
        }
    }
}

/// Accumulated query parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
    populate: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `filters[field][op]=value`
    pub fn filter(mut self, field: &str, op: FilterOp, value: impl ToString) -> Self {
        self.params.push((format!("filters[{}][{}]", field, op.as_str()), value.to_string()));
        self
    }

    /// `filters[field][$eq]=value`
    pub fn eq(self, field: &str, value: impl ToString) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    /// `filters[relation][key][$eq]=value`, e.g. `filters[owner][id][$eq]=4`
    pub fn relation_eq(mut self, relation: &str, key: &str, value: impl ToString) -> Self {
        self.params.push((format!("filters[{}][{}][$eq]", relation, key), value.to_string()));
        self
    }

    /// `filters[field][$in][i]=value` for every value
    pub fn in_list<V: ToString>(mut self, field: &str, values: &[V]) -> Self {
        for (i, value) in values.iter().enumerate() {
            self.params.push((format!("filters[{}][$in][{}]", field, i), value.to_string()));
        }
        self
    }

    /// `filters[relation][key][$in][i]=value` for every value
    pub fn relation_in<V: ToString>(mut self, relation: &str, key: &str, values: &[V]) -> Self {
        for (i, value) in values.iter().enumerate() {
            self.params.push((format!("filters[{}][{}][$in][{}]", relation, key, i), value.to_string()));
        }
        self
    }

    /// Expand a relation in the response
    pub fn populate(mut self, field: &str) -> Self {
        if !self.populate.iter().any(|f| f == field) {
            self.populate.push(field.to_string());
        }
        self
    }

    pub fn sort(mut self, expression: &str) -> Self {
        self.params.push(("sort".to_string(), expression.to_string()));
        self
    }

    /// Encoded parameter pairs, populate entries last
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.params.clone();
        for (i, field) in self.populate.iter().enumerate() {
            pairs.push((format!("populate[{}]", i), field.clone()));
        }
        pairs
    }

    /// Pairs plus `pagination[page]` / `pagination[pageSize]`
    pub fn paged_pairs(&self, page: u32, page_size: u32) -> Vec<(String, String)> {
        let mut pairs = self.pairs();
        pairs.push(("pagination[page]".to_string(), page.to_string()));
        pairs.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_encoding() {
        let query = Query::new()
            .relation_eq("from_user", "id", 4)
            .in_list("invitation_status", &["pending", "accepted"])
            .populate("owner")
            .populate("owner");

        assert_eq!(
            query.pairs(),
            vec![
                ("filters[from_user][id][$eq]".to_string(), "4".to_string()),
                ("filters[invitation_status][$in][0]".to_string(), "pending".to_string()),
                ("filters[invitation_status][$in][1]".to_string(), "accepted".to_string()),
                ("populate[0]".to_string(), "owner".to_string()),
            ]
        );
    }

    #[test]
    fn test_paged_pairs() {
        let pairs = Query::new().filter("name", FilterOp::ContainsI, "alg").paged_pairs(2, 50);
        assert!(pairs.contains(&("filters[name][$containsi]".to_string(), "alg".to_string())));
        assert!(pairs.contains(&("pagination[page]".to_string(), "2".to_string())));
        assert!(pairs.contains(&("pagination[pageSize]".to_string(), "50".to_string())));
    }

    #[test]
    fn test_relation_in() {
        let pairs = Query::new().relation_in("instructors", "id", &[3u64, 9]).pairs();
        assert_eq!(pairs[1], ("filters[instructors][id][$in][1]".to_string(), "9".to_string()));
    }
}
