use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveTime;

use crate::{
    database::Database,
    error::ApiError,
    models::{
        hr::{net_salary, sick_leave_remaining, validate_sick_leave},
        Attendance, CreateAttendance, CreateEmployee, CreateLeave, CreatePayroll, Employee, Leave,
        Payroll,
    },
};

const ATTENDANCE_STATUSES: [&str; 3] = ["Present", "Absent", "Late"];
const LEAVE_TYPES: [&str; 3] = ["Sick", "Vacation", "Emergency"];

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

pub async fn employees_list(State(db): State<Database>) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY id")
        .fetch_all(&db)
        .await?;
    Ok(Json(employees))
}

pub async fn create_employee(
    State(db): State<Database>,
    Json(payload): Json<CreateEmployee>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees (first_name, last_name, email, phone, position, department, date_hired, salary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.position)
    .bind(&payload.department)
    .bind(payload.date_hired)
    .bind(payload.salary)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(db): State<Database>,
    Path(employee_id): Path<i32>,
) -> Result<Json<Employee>, ApiError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(db): State<Database>,
    Path(employee_id): Path<i32>,
    Json(payload): Json<CreateEmployee>,
) -> Result<Json<Employee>, ApiError> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees
        SET first_name = $1, last_name = $2, email = $3, phone = $4,
            position = $5, department = $6, date_hired = $7, salary = $8
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.position)
    .bind(&payload.department)
    .bind(payload.date_hired)
    .bind(payload.salary)
    .bind(employee_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(employee))
}

pub async fn delete_employee(
    State(db): State<Database>,
    Path(employee_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(employee_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Payroll — net pay derived server-side, one record per employee
// ---------------------------------------------------------------------------

pub async fn payroll_list(State(db): State<Database>) -> Result<Json<Vec<Payroll>>, ApiError> {
    let payrolls = sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls ORDER BY id")
        .fetch_all(&db)
        .await?;
    Ok(Json(payrolls))
}

pub async fn create_payroll(
    State(db): State<Database>,
    Json(payload): Json<CreatePayroll>,
) -> Result<(StatusCode, Json<Payroll>), ApiError> {
    let net = net_salary(payload.basic_salary, payload.bonuses, payload.deductions);

    let payroll = sqlx::query_as::<_, Payroll>(
        r#"
        INSERT INTO payrolls (employee_id, basic_salary, deductions, bonuses, net_salary, payment_date)
        VALUES ($1, $2, $3, $4, $5, CURRENT_DATE)
        RETURNING *
        "#,
    )
    .bind(payload.employee)
    .bind(payload.basic_salary)
    .bind(payload.deductions)
    .bind(payload.bonuses)
    .bind(net)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(payroll)))
}

pub async fn get_payroll(
    State(db): State<Database>,
    Path(payroll_id): Path<i32>,
) -> Result<Json<Payroll>, ApiError> {
    let payroll = sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = $1")
        .bind(payroll_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(payroll))
}

pub async fn update_payroll(
    State(db): State<Database>,
    Path(payroll_id): Path<i32>,
    Json(payload): Json<CreatePayroll>,
) -> Result<Json<Payroll>, ApiError> {
    let net = net_salary(payload.basic_salary, payload.bonuses, payload.deductions);

    let payroll = sqlx::query_as::<_, Payroll>(
        r#"
        UPDATE payrolls
        SET employee_id = $1, basic_salary = $2, deductions = $3, bonuses = $4, net_salary = $5
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(payload.employee)
    .bind(payload.basic_salary)
    .bind(payload.deductions)
    .bind(payload.bonuses)
    .bind(net)
    .bind(payroll_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(payroll))
}

pub async fn delete_payroll(
    State(db): State<Database>,
    Path(payroll_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM payrolls WHERE id = $1")
        .bind(payroll_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

pub async fn attendance_list(State(db): State<Database>) -> Result<Json<Vec<Attendance>>, ApiError> {
    let records = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance_records ORDER BY date DESC, id",
    )
    .fetch_all(&db)
    .await?;
    Ok(Json(records))
}

pub async fn create_attendance(
    State(db): State<Database>,
    Json(payload): Json<CreateAttendance>,
) -> Result<(StatusCode, Json<Attendance>), ApiError> {
    if !ATTENDANCE_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }
    let time = payload
        .time
        .unwrap_or_else(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default());

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        INSERT INTO attendance_records (employee_id, date, status, time)
        VALUES ($1, CURRENT_DATE, $2, $3)
        RETURNING *
        "#,
    )
    .bind(payload.employee)
    .bind(&payload.status)
    .bind(time)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn employee_attendance(
    State(db): State<Database>,
    Path(employee_id): Path<i32>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    let records = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance_records WHERE employee_id = $1 ORDER BY date DESC",
    )
    .bind(employee_id)
    .fetch_all(&db)
    .await?;
    Ok(Json(records))
}

// ---------------------------------------------------------------------------
// Leave — sick-leave quota enforced before persistence
// ---------------------------------------------------------------------------

pub async fn leave_list(State(db): State<Database>) -> Result<Json<Vec<Leave>>, ApiError> {
    let leaves = sqlx::query_as::<_, Leave>("SELECT * FROM leaves ORDER BY date DESC, id")
        .fetch_all(&db)
        .await?;
    Ok(Json(leaves))
}

pub async fn create_leave(
    State(db): State<Database>,
    Json(payload): Json<CreateLeave>,
) -> Result<(StatusCode, Json<Leave>), ApiError> {
    if !LEAVE_TYPES.contains(&payload.leave_type.as_str()) {
        return Err(ApiError::field("leave_type", "Invalid leave type."));
    }

    let employee_exists: Option<i32> = sqlx::query_scalar("SELECT id FROM employees WHERE id = $1")
        .bind(payload.employee)
        .fetch_optional(&db)
        .await?;
    if employee_exists.is_none() {
        return Err(ApiError::field("employee", "Unknown employee."));
    }

    let remaining = if payload.leave_type == "Sick" {
        let used: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leaves WHERE employee_id = $1 AND leave_type = 'Sick'",
        )
        .bind(payload.employee)
        .fetch_one(&db)
        .await?;

        validate_sick_leave(used).map_err(|message| ApiError::field("leave_type", &message))?;
        sick_leave_remaining(used)
    } else {
        sick_leave_remaining(0)
    };

    let leave = sqlx::query_as::<_, Leave>(
        r#"
        INSERT INTO leaves (employee_id, date, reason, leave_type, remaining_leaves)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(payload.employee)
    .bind(payload.date)
    .bind(&payload.reason)
    .bind(&payload.leave_type)
    .bind(remaining)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(leave)))
}

pub async fn get_leave(
    State(db): State<Database>,
    Path(leave_id): Path<i32>,
) -> Result<Json<Leave>, ApiError> {
    let leave = sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = $1")
        .bind(leave_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(leave))
}

pub async fn delete_leave(
    State(db): State<Database>,
    Path(leave_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM leaves WHERE id = $1")
        .bind(leave_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
