use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Income {
    pub id: i32,
    pub source: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: String,
    pub reference_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Creation payloads fill in lenient defaults: a missing date is the only
// hard rejection.
#[derive(Debug, Deserialize)]
pub struct CreateIncome {
    #[serde(default = "unknown_party")]
    pub source: String,
    #[serde(default)]
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default = "default_income_category")]
    pub category: String,
    pub reference_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i32,
    pub payee: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: String,
    pub expense_type: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpense {
    #[serde(default = "unknown_party")]
    pub payee: String,
    #[serde(default)]
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default = "default_expense_category")]
    pub category: String,
    pub expense_type: Option<String>,
    pub payment_method: Option<String>,
}

/// Immutable snapshot of a generated report.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ReportHistory {
    pub id: i32,
    pub report_name: String,
    pub report_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub report_summary: Option<String>,
    pub report_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportHistory {
    #[serde(default = "default_report_name")]
    pub report_name: String,
    #[serde(default = "default_report_type")]
    pub report_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub report_summary: Option<String>,
    #[serde(default = "empty_report_data")]
    pub report_data: serde_json::Value,
}

fn unknown_party() -> String {
    "Unknown".to_string()
}

fn default_income_category() -> String {
    "other_income".to_string()
}

fn default_expense_category() -> String {
    "operational_expenses".to_string()
}

fn default_report_name() -> String {
    "Unnamed Report".to_string()
}

fn default_report_type() -> String {
    "income_statement".to_string()
}

fn empty_report_data() -> serde_json::Value {
    serde_json::json!({})
}
