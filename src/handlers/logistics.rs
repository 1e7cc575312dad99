use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    database::Database,
    error::ApiError,
    ids,
    models::{
        logistics::can_transition, CreateOrder, CreateProofOfDelivery, CreateVehicle,
        CreateWarehouse, Order, ProofOfDeliveryDisplay, Shipment, UpdateOrder, Vehicle, Warehouse,
    },
};

const ORDER_STATUSES: [&str; 5] = ["pending", "shipped", "delivered", "failed", "canceled"];

// ---------------------------------------------------------------------------
// Warehouses
// ---------------------------------------------------------------------------

pub async fn warehouses_list(State(db): State<Database>) -> Result<Json<Vec<Warehouse>>, ApiError> {
    let warehouses = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses ORDER BY id")
        .fetch_all(&db)
        .await?;
    Ok(Json(warehouses))
}

pub async fn create_warehouse(
    State(db): State<Database>,
    Json(payload): Json<CreateWarehouse>,
) -> Result<(StatusCode, Json<Warehouse>), ApiError> {
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "INSERT INTO warehouses (name, address) VALUES ($1, $2) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .fetch_one(&db)
    .await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn get_warehouse(
    State(db): State<Database>,
    Path(warehouse_id): Path<i32>,
) -> Result<Json<Warehouse>, ApiError> {
    let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
        .bind(warehouse_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(warehouse))
}

pub async fn update_warehouse(
    State(db): State<Database>,
    Path(warehouse_id): Path<i32>,
    Json(payload): Json<CreateWarehouse>,
) -> Result<Json<Warehouse>, ApiError> {
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "UPDATE warehouses SET name = $1, address = $2 WHERE id = $3 RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(warehouse_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(warehouse))
}

pub async fn delete_warehouse(
    State(db): State<Database>,
    Path(warehouse_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(warehouse_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

pub async fn vehicles_list(State(db): State<Database>) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY id")
        .fetch_all(&db)
        .await?;
    Ok(Json(vehicles))
}

pub async fn create_vehicle(
    State(db): State<Database>,
    Json(payload): Json<CreateVehicle>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        INSERT INTO vehicles (license_plate, capacity, current_location)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&payload.license_plate)
    .bind(payload.capacity)
    .bind(&payload.current_location)
    .fetch_one(&db)
    .await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn get_vehicle(
    State(db): State<Database>,
    Path(vehicle_id): Path<i32>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(vehicle))
}

pub async fn update_vehicle(
    State(db): State<Database>,
    Path(vehicle_id): Path<i32>,
    Json(payload): Json<CreateVehicle>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        UPDATE vehicles
        SET license_plate = $1, capacity = $2, current_location = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(&payload.license_plate)
    .bind(payload.capacity)
    .bind(&payload.current_location)
    .bind(vehicle_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(vehicle))
}

pub async fn delete_vehicle(
    State(db): State<Database>,
    Path(vehicle_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub async fn orders_list(State(db): State<Database>) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY order_date DESC, id DESC")
        .fetch_all(&db)
        .await?;
    Ok(Json(orders))
}

pub async fn create_order(
    State(db): State<Database>,
    Json(payload): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    if !ORDER_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    // Allocate the next OTN number off the latest order; same caveat as the
    // client-id series in ids.rs.
    let last: Option<String> =
        sqlx::query_scalar("SELECT order_number FROM orders ORDER BY id DESC LIMIT 1")
            .fetch_optional(&db)
            .await?;
    let order_number = ids::next_order_number(last.as_deref());

    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (customer_name, warehouse_id, vehicle_id, item_id, order_date,
                            status, order_number, delivery_address, total_amount)
        VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&payload.customer_name)
    .bind(payload.warehouse)
    .bind(payload.vehicle)
    .bind(payload.item)
    .bind(&payload.status)
    .bind(&order_number)
    .bind(&payload.delivery_address)
    .bind(payload.total_amount)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(db): State<Database>,
    Path(order_id): Path<i32>,
) -> Result<Json<Order>, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(order))
}

pub async fn update_order(
    State(db): State<Database>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateOrder>,
) -> Result<Json<Order>, ApiError> {
    if !ORDER_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    let current: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !can_transition(&current, &payload.status) {
        return Err(ApiError::field(
            "status",
            &format!("Cannot change status from '{current}' to '{}'.", payload.status),
        ));
    }

    // order_number is allocated at creation and never rewritten
    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET customer_name = $1, warehouse_id = $2, vehicle_id = $3, item_id = $4,
            status = $5, delivery_address = $6, total_amount = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&payload.customer_name)
    .bind(payload.warehouse)
    .bind(payload.vehicle)
    .bind(payload.item)
    .bind(&payload.status)
    .bind(&payload.delivery_address)
    .bind(payload.total_amount)
    .bind(order_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(order))
}

pub async fn delete_order(
    State(db): State<Database>,
    Path(order_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(order_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Ships a pending order: creates the shipment with a fresh tracking number
/// and moves the order to `shipped` in one transaction.
pub async fn ship_order(
    State(db): State<Database>,
    Path(order_id): Path<i32>,
) -> Result<(StatusCode, Json<Shipment>), ApiError> {
    let mut tx = db.begin().await?;

    let order: Option<(String, Option<i32>)> =
        sqlx::query_as("SELECT status, vehicle_id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (status, vehicle_id) = order.ok_or(ApiError::NotFound)?;

    if status != "pending" {
        return Err(ApiError::BadRequest(format!(
            "Order cannot be shipped from status '{status}'."
        )));
    }

    let tracking_number = ids::generate_tracking_number();

    let shipment = sqlx::query_as::<_, Shipment>(
        r#"
        INSERT INTO shipments (order_id, vehicle_id, tracking_number, status, shipped_date)
        VALUES ($1, $2, $3, 'shipped', NOW())
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(vehicle_id)
    .bind(&tracking_number)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE orders SET status = 'shipped' WHERE id = $1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    log::info!("order {order_id} shipped as {tracking_number}");
    Ok((StatusCode::CREATED, Json(shipment)))
}

// ---------------------------------------------------------------------------
// Shipments
// ---------------------------------------------------------------------------

pub async fn shipments_list(State(db): State<Database>) -> Result<Json<Vec<Shipment>>, ApiError> {
    let shipments =
        sqlx::query_as::<_, Shipment>("SELECT * FROM shipments ORDER BY shipped_date DESC, id DESC")
            .fetch_all(&db)
            .await?;
    Ok(Json(shipments))
}

pub async fn get_shipment(
    State(db): State<Database>,
    Path(shipment_id): Path<i32>,
) -> Result<Json<Shipment>, ApiError> {
    let shipment = sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1")
        .bind(shipment_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(shipment))
}

pub async fn delete_shipment(
    State(db): State<Database>,
    Path(shipment_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
        .bind(shipment_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Proof of delivery
// ---------------------------------------------------------------------------

/// Records the delivery outcome for a shipment and propagates the final
/// status to the shipment and its order atomically. One proof per shipment.
pub async fn submit_proof_of_delivery(
    State(db): State<Database>,
    Json(payload): Json<CreateProofOfDelivery>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let proof = payload.validate().map_err(ApiError::Validation)?;

    let mut tx = db.begin().await?;

    // Lock the shipment row so two couriers can't both file a proof.
    let shipment: Option<(String, Option<i32>)> =
        sqlx::query_as("SELECT status, order_id FROM shipments WHERE id = $1 FOR UPDATE")
            .bind(proof.shipment)
            .fetch_optional(&mut *tx)
            .await?;
    let (shipment_status, order_id) = shipment.ok_or(ApiError::NotFound)?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM proof_of_deliveries WHERE shipment_id = $1")
            .bind(proof.shipment)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(ApiError::field(
            "shipment",
            "Proof of delivery already exists for this shipment.",
        ));
    }

    let new_status = proof.status();
    if !can_transition(&shipment_status, new_status) {
        return Err(ApiError::field(
            "shipment",
            &format!("Shipment in status '{shipment_status}' cannot be marked '{new_status}'."),
        ));
    }

    let proof_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO proof_of_deliveries (shipment_id, delivery_status, failed_reason, delivered_by, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(proof.shipment)
    .bind(new_status)
    .bind(&proof.failed_reason)
    .bind(&proof.delivered_by)
    .bind(&proof.notes)
    .fetch_one(&mut *tx)
    .await?;

    if proof.delivered {
        sqlx::query("UPDATE shipments SET status = $1, delivered_date = NOW() WHERE id = $2")
            .bind(new_status)
            .bind(proof.shipment)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("UPDATE shipments SET status = $1 WHERE id = $2")
            .bind(new_status)
            .bind(proof.shipment)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(order_id) = order_id {
        sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(new_status)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    log::info!("shipment {} marked {new_status}", proof.shipment);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Proof of delivery recorded successfully.",
            "id": proof_id,
        })),
    ))
}

const PROOF_DISPLAY: &str = r#"
    SELECT p.id,
           s.tracking_number,
           p.delivery_status,
           COALESCE(p.failed_reason, 'N/A') AS failed_reason,
           COALESCE(p.delivered_by, 'N/A') AS delivered_by,
           COALESCE(o.customer_name, 'N/A') AS customer_name,
           COALESCE(o.order_number, 'N/A') AS order_number,
           COALESCE(w.name, 'N/A') AS warehouse_name,
           COALESCE(v.license_plate, 'N/A') AS vehicle_plate,
           p.created_at
    FROM proof_of_deliveries p
    JOIN shipments s ON s.id = p.shipment_id
    LEFT JOIN orders o ON o.id = s.order_id
    LEFT JOIN warehouses w ON w.id = o.warehouse_id
    LEFT JOIN vehicles v ON v.id = s.vehicle_id
"#;

pub async fn proofs_list(
    State(db): State<Database>,
) -> Result<Json<Vec<ProofOfDeliveryDisplay>>, ApiError> {
    let query = format!("{PROOF_DISPLAY} ORDER BY p.created_at DESC");
    let proofs = sqlx::query_as::<_, ProofOfDeliveryDisplay>(&query)
        .fetch_all(&db)
        .await?;
    Ok(Json(proofs))
}

pub async fn get_proof(
    State(db): State<Database>,
    Path(proof_id): Path<i32>,
) -> Result<Json<ProofOfDeliveryDisplay>, ApiError> {
    let query = format!("{PROOF_DISPLAY} WHERE p.id = $1");
    let proof = sqlx::query_as::<_, ProofOfDeliveryDisplay>(&query)
        .bind(proof_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(proof))
}

pub async fn delete_proof(
    State(db): State<Database>,
    Path(proof_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM proof_of_deliveries WHERE id = $1")
        .bind(proof_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
