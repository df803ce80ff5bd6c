//! Book catalog and dashboard models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published book available for author copy orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub formats: Vec<String>,
}

/// Aggregated royalty figures for the dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default)]
    pub total_royalty_earned: f64,
    #[serde(default)]
    pub current_month_growth: f64,
    #[serde(default)]
    pub copies_sold: u64,
}

/// A reader purchase of one of the author's books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized page of results.
///
/// The backend sometimes returns a bare array and sometimes a wrapper object
/// with a total-page count; both are folded into this one shape at the
/// request boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn single(items: Vec<T>) -> Self {
        Self {
            items,
            page: 1,
            total_pages: 1,
        }
    }
}
