//! Catalog and dashboard fetch operations
//!
//! Typed reads the dashboard cards and purchase flow depend on. Response
//! shapes the backend leaves ambiguous (bare array vs. wrapper object) are
//! normalized here, once, instead of at every call site.

use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiTransport;
use crate::error::ApiResult;
use crate::models::{Book, DashboardMetrics, Page, Purchase};

/// Read-side catalog client
pub struct Catalog {
    transport: Arc<dyn ApiTransport>,
}

impl Catalog {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// List the author's published books.
    ///
    /// Accepts either a bare array or a `{books: [...]}` wrapper.
    pub async fn list_books(&self) -> ApiResult<Vec<Book>> {
        let value = self.transport.get("books").await?;
        let items = match value {
            Value::Array(_) => value,
            Value::Object(mut map) => map.remove("books").unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        Ok(serde_json::from_value(items)?)
    }

    /// Aggregated royalty figures for the dashboard.
    pub async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        let value = self.transport.get("books/dashboard").await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Recent reader purchases, paginated.
    ///
    /// Accepts either a bare array (single page) or a
    /// `{purchases: [...], totalPages}` wrapper.
    pub async fn recent_purchases(&self, page: u32, timeframe: &str) -> ApiResult<Page<Purchase>> {
        let path = format!("author/purchases?page={}&timeframe={}", page, timeframe);
        let value = self.transport.get(&path).await?;

        match value {
            Value::Array(_) => Ok(Page::single(serde_json::from_value(value)?)),
            Value::Object(mut map) => {
                let items = map.remove("purchases").unwrap_or(Value::Array(Vec::new()));
                let total_pages = map
                    .get("totalPages")
                    .and_then(Value::as_u64)
                    .unwrap_or(1) as u32;
                Ok(Page {
                    items: serde_json::from_value(items)?,
                    page,
                    total_pages,
                })
            }
            _ => Ok(Page::single(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_books_accepts_bare_array() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_ok(
            "GET",
            "books",
            json!([{"_id": "b1", "title": "First", "price": 299.0}]),
        );

        let catalog = Catalog::new(mock);
        let books = catalog.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, "b1");
    }

    #[tokio::test]
    async fn test_list_books_accepts_wrapper_object() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_ok(
            "GET",
            "books",
            json!({"books": [{"id": "b2", "title": "Second", "price": 150.0}]}),
        );

        let catalog = Catalog::new(mock);
        let books = catalog.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Second");
    }

    #[tokio::test]
    async fn test_recent_purchases_normalizes_wrapper() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_ok(
            "GET",
            "author/purchases?page=2&timeframe=month",
            json!({
                "purchases": [{"_id": "p1", "bookTitle": "First", "amount": 299.0}],
                "totalPages": 5
            }),
        );

        let catalog = Catalog::new(mock);
        let page = catalog.recent_purchases(2, "month").await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 5);
    }

    #[tokio::test]
    async fn test_recent_purchases_accepts_bare_array() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_ok("GET", "author/purchases?page=1&timeframe=week", json!([]));

        let catalog = Catalog::new(mock);
        let page = catalog.recent_purchases(1, "week").await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
