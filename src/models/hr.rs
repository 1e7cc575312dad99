use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: String,
    pub date_hired: NaiveDate,
    pub salary: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: String,
    pub date_hired: NaiveDate,
    pub salary: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Payroll {
    pub id: i32,
    #[serde(rename = "employee")]
    pub employee_id: i32,
    pub basic_salary: Decimal,
    pub deductions: Decimal,
    pub bonuses: Decimal,
    pub net_salary: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreatePayroll {
    pub employee: i32,
    pub basic_salary: Decimal,
    #[serde(default)]
    pub deductions: Decimal,
    #[serde(default)]
    pub bonuses: Decimal,
}

/// Net pay is always derived server-side, never accepted from the caller.
pub fn net_salary(basic_salary: Decimal, bonuses: Decimal, deductions: Decimal) -> Decimal {
    basic_salary + bonuses - deductions
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: i32,
    #[serde(rename = "employee")]
    pub employee_id: i32,
    pub date: NaiveDate,
    pub status: String,
    pub time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateAttendance {
    pub employee: i32,
    #[serde(default = "default_attendance_status")]
    pub status: String,
    pub time: Option<NaiveTime>,
}

fn default_attendance_status() -> String {
    "Present".to_string()
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Leave {
    pub id: i32,
    #[serde(rename = "employee")]
    pub employee_id: i32,
    pub date: NaiveDate,
    pub reason: String,
    pub leave_type: String,
    pub remaining_leaves: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeave {
    pub employee: i32,
    pub date: NaiveDate,
    pub reason: String,
    #[serde(default = "default_leave_type")]
    pub leave_type: String,
}

fn default_leave_type() -> String {
    "Sick".to_string()
}

pub const SICK_LEAVE_QUOTA: i64 = 20;

/// Remaining sick leaves given the count already taken, clamped at zero.
/// The count excludes the leave being created.
pub fn sick_leave_remaining(used: i64) -> i32 {
    (SICK_LEAVE_QUOTA - used).max(0) as i32
}

/// Quota check run before persistence, so the boundary can turn a violation
/// into a field-keyed 400 instead of a hard failure mid-save.
pub fn validate_sick_leave(used: i64) -> Result<(), String> {
    if used >= SICK_LEAVE_QUOTA {
        Err("Cannot take more than 20 sick leaves.".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_salary_adds_bonuses_and_subtracts_deductions() {
        let net = net_salary(
            Decimal::from(3000),
            Decimal::from(250),
            Decimal::from(100),
        );
        assert_eq!(net, Decimal::from(3150));
    }

    #[test]
    fn sick_leave_quota_allows_the_twentieth_and_rejects_the_twenty_first() {
        assert!(validate_sick_leave(19).is_ok());
        assert!(validate_sick_leave(20).is_err());
        assert!(validate_sick_leave(25).is_err());
    }

    #[test]
    fn remaining_sick_leaves_clamp_at_zero() {
        assert_eq!(sick_leave_remaining(0), 20);
        assert_eq!(sick_leave_remaining(5), 15);
        assert_eq!(sick_leave_remaining(20), 0);
        assert_eq!(sick_leave_remaining(30), 0);
    }
}
