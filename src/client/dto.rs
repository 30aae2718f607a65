use serde::{Deserialize, Serialize};

/// One page of a collection as returned by a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Value of `X-Total-Count`, or the item count when the header is missing.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: Option<u64>) -> Self {
        let total = total.unwrap_or(items.len() as u64);
        Self { items, total }
    }
}
