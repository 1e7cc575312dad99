use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub item_no: String,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Read-side shape with the category name joined in for display.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ItemWithCategory {
    pub id: i32,
    pub item_no: String,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: i32,
    pub category_name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub item_no: String,
    pub name: String,
    pub category: i32,
    pub price: Decimal,
    pub description: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
}

// Partial update: absent fields keep their current values.
#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub item_no: Option<String>,
    pub name: Option<String>,
    pub category: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock_quantity: Option<i32>,
}
