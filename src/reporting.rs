//! Financial aggregation: time-range vocabulary, period bucketing, and the
//! payload shapes served by the finance dashboard endpoints.
//!
//! Everything here is pure — handlers fetch rows and hand them over, so the
//! numeric invariants (net = income − expenses, zero change against an empty
//! previous period, chronological buckets) are checked in the unit tests
//! below without a database.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One income or expense row inside an aggregation window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntryRow {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
}

/// Window start for the chart endpoints. Unrecognized values fall back to
/// three months.
pub fn window_start(time_range: &str, today: NaiveDate) -> NaiveDate {
    match time_range {
        "30days" => today - Duration::days(30),
        "3months" => today - Duration::days(90),
        "6months" => today - Duration::days(180),
        "1year" => today - Duration::days(365),
        _ => today - Duration::days(90),
    }
}

/// Window start for the summary endpoint. Unrecognized values mean
/// month-to-date rather than the 90-day fallback.
pub fn summary_window_start(time_range: &str, today: NaiveDate) -> NaiveDate {
    match time_range {
        "30days" | "3months" | "6months" | "1year" => window_start(time_range, today),
        _ => today.with_day(1).unwrap_or(today),
    }
}

/// The immediately preceding window of equal day length: `[start − len, start − 1]`.
pub fn previous_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let len = (end - start).num_days();
    (start - Duration::days(len), start - Duration::days(1))
}

/// Period-over-period change in percent. Zero when the previous period is
/// zero — that masks a truly undefined change, but it keeps dashboards
/// render-able and matches the documented policy.
pub fn percent_change(current: Decimal, previous: Decimal) -> f64 {
    if previous.is_zero() {
        0.0
    } else {
        ((current - previous) / previous * Decimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

pub fn total(rows: &[EntryRow]) -> Decimal {
    rows.iter().map(|row| row.amount).sum()
}

/// Per-category sums, ordered by category name for a stable payload.
pub fn sum_by_category(rows: &[EntryRow]) -> Vec<CategoryAmount> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.category.as_str()).or_insert(Decimal::ZERO) += row.amount;
    }
    totals
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category: category.to_string(),
            amount,
        })
        .collect()
}

/// Per-category sums ordered by amount descending (income statement shape).
pub fn sum_by_category_desc(rows: &[EntryRow]) -> Vec<CategoryAmount> {
    let mut breakdown = sum_by_category(rows);
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Monthly,
    Quarterly,
    Yearly,
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Period {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Period::Monthly),
            "quarterly" => Some(Period::Quarterly),
            "yearly" => Some(Period::Yearly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    // Sortable bucket key: (year, month) / (year, quarter) / (year, 0).
    fn bucket_key(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Period::Monthly => (date.year(), date.month()),
            Period::Quarterly => (date.year(), (date.month() - 1) / 3 + 1),
            Period::Yearly => (date.year(), 0),
        }
    }

    fn bucket_label(self, key: (i32, u32)) -> String {
        match self {
            Period::Monthly => format!("{} {}", MONTHS[(key.1 as usize - 1) % 12], key.0),
            Period::Quarterly => format!("Q{} {}", key.1, key.0),
            Period::Yearly => key.0.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CashFlow {
    pub labels: Vec<String>,
    #[serde(rename = "incomeData")]
    pub income_data: Vec<f64>,
    #[serde(rename = "expensesData")]
    pub expenses_data: Vec<f64>,
    #[serde(rename = "netData")]
    pub net_data: Vec<f64>,
    pub period: String,
    #[serde(rename = "timeRange")]
    pub time_range: String,
}

/// Bucket both series by the requested period and merge them into aligned
/// label/value arrays, chronologically ordered.
pub fn cash_flow_series(
    period: Period,
    time_range: &str,
    incomes: &[EntryRow],
    expenses: &[EntryRow],
) -> CashFlow {
    let mut buckets: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for row in incomes {
        let entry = buckets
            .entry(period.bucket_key(row.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += row.amount;
    }
    for row in expenses {
        let entry = buckets
            .entry(period.bucket_key(row.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.1 += row.amount;
    }

    let mut flow = empty_cash_flow(period.as_str(), time_range);
    for (key, (income, expense)) in buckets {
        flow.labels.push(period.bucket_label(key));
        flow.income_data.push(income.to_f64().unwrap_or(0.0));
        flow.expenses_data.push(expense.to_f64().unwrap_or(0.0));
        flow.net_data.push((income - expense).to_f64().unwrap_or(0.0));
    }
    flow
}

pub fn empty_cash_flow(period: &str, time_range: &str) -> CashFlow {
    CashFlow {
        labels: Vec::new(),
        income_data: Vec::new(),
        expenses_data: Vec::new(),
        net_data: Vec::new(),
        period: period.to_string(),
        time_range: time_range.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct PeriodComparison {
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Serialize)]
pub struct FinancialSummary {
    #[serde(rename = "totalIncome")]
    pub total_income: Decimal,
    #[serde(rename = "totalExpenses")]
    pub total_expenses: Decimal,
    #[serde(rename = "netIncome")]
    pub net_income: Decimal,
    #[serde(rename = "incomeByCategory")]
    pub income_by_category: Vec<CategoryAmount>,
    #[serde(rename = "expensesByCategory")]
    pub expenses_by_category: Vec<CategoryAmount>,
    #[serde(rename = "comparisonToPreviousPeriod")]
    pub comparison_to_previous_period: PeriodComparison,
    #[serde(rename = "timeRange")]
    pub time_range: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

pub fn build_summary(
    time_range: &str,
    start: NaiveDate,
    end: NaiveDate,
    incomes: &[EntryRow],
    expenses: &[EntryRow],
    prev_income: Decimal,
    prev_expenses: Decimal,
) -> FinancialSummary {
    let total_income = total(incomes);
    let total_expenses = total(expenses);
    let net_income = total_income - total_expenses;
    let prev_profit = prev_income - prev_expenses;

    FinancialSummary {
        total_income,
        total_expenses,
        net_income,
        income_by_category: sum_by_category(incomes),
        expenses_by_category: sum_by_category(expenses),
        comparison_to_previous_period: PeriodComparison {
            income: percent_change(total_income, prev_income),
            expenses: percent_change(total_expenses, prev_expenses),
            profit: percent_change(net_income, prev_profit),
        },
        time_range: time_range.to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    }
}

/// Fallback shape when the summary query fails: zeros over a 90-day window.
pub fn empty_summary(time_range: &str, today: NaiveDate) -> FinancialSummary {
    build_summary(
        time_range,
        today - Duration::days(90),
        today,
        &[],
        &[],
        Decimal::ZERO,
        Decimal::ZERO,
    )
}

#[derive(Debug, Serialize)]
pub struct BalanceSection {
    pub total: Decimal,
    pub breakdown: Vec<CategoryAmount>,
}

#[derive(Debug, Serialize)]
pub struct BalanceSheet {
    pub assets: BalanceSection,
    pub liabilities: BalanceSection,
    pub equity: BalanceSection,
    #[serde(rename = "asOfDate")]
    pub as_of_date: String,
}

/// Simplified point-in-time model: cumulative income as assets, cumulative
/// expenses as liabilities, the difference as equity. Not standard
/// accounting, but it is what the dashboard renders.
pub fn build_balance_sheet(
    total_assets: Decimal,
    total_liabilities: Decimal,
    as_of: NaiveDate,
) -> BalanceSheet {
    let equity = total_assets - total_liabilities;
    BalanceSheet {
        assets: BalanceSection {
            total: total_assets,
            breakdown: vec![CategoryAmount {
                category: "Cash & Equivalents".to_string(),
                amount: total_assets,
            }],
        },
        liabilities: BalanceSection {
            total: total_liabilities,
            breakdown: vec![CategoryAmount {
                category: "Accounts Payable".to_string(),
                amount: total_liabilities,
            }],
        },
        equity: BalanceSection {
            total: equity,
            breakdown: vec![CategoryAmount {
                category: "Retained Earnings".to_string(),
                amount: equity,
            }],
        },
        as_of_date: as_of.to_string(),
    }
}

pub fn empty_balance_sheet(as_of: NaiveDate) -> BalanceSheet {
    BalanceSheet {
        assets: BalanceSection {
            total: Decimal::ZERO,
            breakdown: Vec::new(),
        },
        liabilities: BalanceSection {
            total: Decimal::ZERO,
            breakdown: Vec::new(),
        },
        equity: BalanceSection {
            total: Decimal::ZERO,
            breakdown: Vec::new(),
        },
        as_of_date: as_of.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct IncomeStatement {
    #[serde(rename = "reportType")]
    pub report_type: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub revenues: Vec<CategoryAmount>,
    pub expenses: Vec<CategoryAmount>,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: Decimal,
    #[serde(rename = "totalExpenses")]
    pub total_expenses: Decimal,
    #[serde(rename = "netIncome")]
    pub net_income: Decimal,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
}

pub fn build_income_statement(
    start: NaiveDate,
    end: NaiveDate,
    incomes: &[EntryRow],
    expenses: &[EntryRow],
    generated_at: String,
) -> IncomeStatement {
    let total_revenue = total(incomes);
    let total_expenses = total(expenses);
    IncomeStatement {
        report_type: "Income Statement".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        revenues: sum_by_category_desc(incomes),
        expenses: sum_by_category_desc(expenses),
        total_revenue,
        total_expenses,
        net_income: total_revenue - total_expenses,
        generated_at,
    }
}

pub fn empty_income_statement(start: NaiveDate, end: NaiveDate, generated_at: String) -> IncomeStatement {
    build_income_statement(start, end, &[], &[], generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: NaiveDate, amount: i64, category: &str) -> EntryRow {
        EntryRow {
            date,
            amount: Decimal::from(amount),
            category: category.to_string(),
        }
    }

    #[test]
    fn window_starts_subtract_fixed_day_counts() {
        let today = day(2024, 6, 15);
        assert_eq!(window_start("30days", today), day(2024, 5, 16));
        assert_eq!(window_start("3months", today), day(2024, 3, 17));
        assert_eq!(window_start("6months", today), day(2023, 12, 18));
        assert_eq!(window_start("1year", today), day(2023, 6, 16));
        assert_eq!(window_start("bogus", today), day(2024, 3, 17));
    }

    #[test]
    fn summary_default_is_month_to_date() {
        let today = day(2024, 6, 15);
        assert_eq!(summary_window_start("anything", today), day(2024, 6, 1));
        assert_eq!(summary_window_start("30days", today), day(2024, 5, 16));
    }

    #[test]
    fn previous_window_has_equal_length_and_ends_before_start() {
        let start = day(2024, 5, 16);
        let end = day(2024, 6, 15);
        let (prev_start, prev_end) = previous_window(start, end);
        assert_eq!(prev_end, day(2024, 5, 15));
        assert_eq!(prev_start, day(2024, 4, 16));
        // [start − len, start − 1] spans len days inclusive, so the
        // end-minus-start difference is one less than len
        let len = (end - start).num_days();
        assert_eq!((prev_end - prev_start).num_days(), len - 1);
    }

    #[test]
    fn percent_change_is_zero_when_previous_is_zero() {
        assert_eq!(percent_change(Decimal::from(5000), Decimal::ZERO), 0.0);
        assert_eq!(percent_change(Decimal::ZERO, Decimal::ZERO), 0.0);
    }

    #[test]
    fn percent_change_basic_arithmetic() {
        assert_eq!(percent_change(Decimal::from(150), Decimal::from(100)), 50.0);
        assert_eq!(percent_change(Decimal::from(50), Decimal::from(100)), -50.0);
    }

    #[test]
    fn summary_net_is_income_minus_expenses() {
        let incomes = vec![
            row(day(2024, 6, 1), 1200, "sales"),
            row(day(2024, 6, 3), 300, "consulting"),
        ];
        let expenses = vec![row(day(2024, 6, 2), 400, "rent")];
        let summary = build_summary(
            "30days",
            day(2024, 5, 16),
            day(2024, 6, 15),
            &incomes,
            &expenses,
            Decimal::ZERO,
            Decimal::from(200),
        );

        assert_eq!(summary.total_income, Decimal::from(1500));
        assert_eq!(summary.total_expenses, Decimal::from(400));
        assert_eq!(summary.net_income, Decimal::from(1100));
        // previous income was zero, so the change reports 0 regardless
        assert_eq!(summary.comparison_to_previous_period.income, 0.0);
        assert_eq!(summary.comparison_to_previous_period.expenses, 100.0);
        assert_eq!(summary.start_date, "2024-05-16");
        assert_eq!(summary.end_date, "2024-06-15");
    }

    #[test]
    fn category_sums_group_and_sort_by_name() {
        let rows = vec![
            row(day(2024, 6, 1), 100, "rent"),
            row(day(2024, 6, 2), 50, "payroll"),
            row(day(2024, 6, 3), 25, "rent"),
        ];
        let breakdown = sum_by_category(&rows);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "payroll");
        assert_eq!(breakdown[1].category, "rent");
        assert_eq!(breakdown[1].amount, Decimal::from(125));
    }

    #[test]
    fn income_statement_breakdowns_sort_descending_by_amount() {
        let rows = vec![
            row(day(2024, 6, 1), 10, "small"),
            row(day(2024, 6, 2), 900, "big"),
            row(day(2024, 6, 3), 40, "mid"),
        ];
        let statement =
            build_income_statement(day(2024, 6, 1), day(2024, 6, 30), &rows, &[], String::new());
        let categories: Vec<&str> = statement.revenues.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["big", "mid", "small"]);
        assert_eq!(statement.total_revenue, Decimal::from(950));
        assert_eq!(statement.net_income, Decimal::from(950));
    }

    #[test]
    fn monthly_buckets_merge_rows_in_the_same_month() {
        let incomes = vec![
            row(day(2024, 1, 5), 100, "sales"),
            row(day(2024, 1, 28), 150, "sales"),
            row(day(2024, 2, 2), 75, "sales"),
        ];
        let flow = cash_flow_series(Period::Monthly, "3months", &incomes, &[]);
        assert_eq!(flow.labels, vec!["Jan 2024", "Feb 2024"]);
        assert_eq!(flow.income_data, vec![250.0, 75.0]);
        assert_eq!(flow.net_data, vec![250.0, 75.0]);
    }

    #[test]
    fn buckets_are_chronological_across_year_boundaries() {
        let incomes = vec![
            row(day(2024, 1, 10), 5, "sales"),
            row(day(2023, 12, 10), 9, "sales"),
        ];
        let flow = cash_flow_series(Period::Monthly, "6months", &incomes, &[]);
        assert_eq!(flow.labels, vec!["Dec 2023", "Jan 2024"]);
    }

    #[test]
    fn quarter_labels_follow_the_month_to_quarter_rule() {
        let incomes = vec![
            row(day(2024, 1, 1), 1, "a"),
            row(day(2024, 3, 31), 1, "a"),
            row(day(2024, 4, 1), 2, "a"),
            row(day(2024, 12, 31), 3, "a"),
        ];
        let flow = cash_flow_series(Period::Quarterly, "1year", &incomes, &[]);
        assert_eq!(flow.labels, vec!["Q1 2024", "Q2 2024", "Q4 2024"]);
        assert_eq!(flow.income_data, vec![2.0, 2.0, 3.0]);
    }

    #[test]
    fn yearly_buckets_use_plain_year_labels() {
        let incomes = vec![row(day(2023, 7, 1), 10, "a")];
        let expenses = vec![row(day(2024, 2, 1), 4, "b")];
        let flow = cash_flow_series(Period::Yearly, "1year", &incomes, &expenses);
        assert_eq!(flow.labels, vec!["2023", "2024"]);
        assert_eq!(flow.expenses_data, vec![0.0, 4.0]);
        assert_eq!(flow.net_data, vec![10.0, -4.0]);
    }

    #[test]
    fn expense_only_buckets_still_appear() {
        let expenses = vec![row(day(2024, 5, 20), 60, "rent")];
        let flow = cash_flow_series(Period::Monthly, "30days", &[], &expenses);
        assert_eq!(flow.labels, vec!["May 2024"]);
        assert_eq!(flow.income_data, vec![0.0]);
        assert_eq!(flow.expenses_data, vec![60.0]);
        assert_eq!(flow.net_data, vec![-60.0]);
    }

    #[test]
    fn balance_sheet_equity_is_assets_minus_liabilities() {
        let sheet = build_balance_sheet(Decimal::from(900), Decimal::from(350), day(2024, 6, 15));
        assert_eq!(sheet.equity.total, Decimal::from(550));
        assert_eq!(sheet.assets.breakdown[0].category, "Cash & Equivalents");
        assert_eq!(sheet.as_of_date, "2024-06-15");
    }

    #[test]
    fn empty_shapes_are_zero_valued() {
        let summary = empty_summary("3months", day(2024, 6, 15));
        assert_eq!(summary.total_income, Decimal::ZERO);
        assert!(summary.income_by_category.is_empty());
        assert_eq!(summary.comparison_to_previous_period.profit, 0.0);

        let sheet = empty_balance_sheet(day(2024, 6, 15));
        assert!(sheet.assets.breakdown.is_empty());

        let flow = empty_cash_flow("monthly", "3months");
        assert!(flow.labels.is_empty() && flow.net_data.is_empty());
    }

    #[test]
    fn period_parse_round_trips() {
        assert_eq!(Period::parse("monthly"), Some(Period::Monthly));
        assert_eq!(Period::parse("quarterly"), Some(Period::Quarterly));
        assert_eq!(Period::parse("yearly"), Some(Period::Yearly));
        assert_eq!(Period::parse("weekly"), None);
    }
}
