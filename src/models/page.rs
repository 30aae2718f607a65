use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination and sort parameters shared by the list endpoints and the client.
///
/// `sort` uses the `field,dir` form, e.g. `title,desc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size.clamp(1, MAX_PAGE_SIZE))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }

    /// Builds an `ORDER BY` clause from `sort`, only accepting columns listed
    /// in `allowed` as `(field, column)` pairs. Falls back to `fallback`.
    pub fn order_clause(&self, allowed: &[(&str, &str)], fallback: &str) -> String {
        let Some(sort) = self.sort.as_deref() else {
            return format!("ORDER BY {} ASC", fallback);
        };

        let mut parts = sort.splitn(2, ',');
        let field = parts.next().unwrap_or_default().trim();
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "desc" => "DESC",
            _ => "ASC",
        };

        match allowed.iter().find(|(name, _)| *name == field) {
            Some((_, column)) => format!("ORDER BY {} {}", column, direction),
            None => format!("ORDER BY {} ASC", fallback),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[(&str, &str)] = &[("id", "c.id"), ("title", "c.title")];

    #[test]
    fn order_clause_accepts_known_columns_only() {
        let req = PageRequest::default().sorted_by("title,desc");
        assert_eq!(req.order_clause(COLUMNS, "c.id"), "ORDER BY c.title DESC");

        let req = PageRequest::default().sorted_by("title; DROP TABLE course");
        assert_eq!(req.order_clause(COLUMNS, "c.id"), "ORDER BY c.id ASC");
    }

    #[test]
    fn offset_follows_page_and_clamped_size() {
        let req = PageRequest::new(3, 0);
        assert_eq!(req.limit(), 1);
        assert_eq!(req.offset(), 3);
    }
}
