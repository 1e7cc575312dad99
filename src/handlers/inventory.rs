use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    database::Database,
    error::ApiError,
    models::{Category, CreateCategory, CreateItem, Item, ItemWithCategory, UpdateItem},
};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub async fn categories_list(State(db): State<Database>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&db)
        .await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(db): State<Database>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(db): State<Database>,
    Path(category_id): Path<i32>,
) -> Result<Json<Category>, ApiError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(category))
}

pub async fn update_category(
    State(db): State<Database>,
    Path(category_id): Path<i32>,
    Json(payload): Json<CreateCategory>,
) -> Result<Json<Category>, ApiError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $1, description = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(category_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(category))
}

pub async fn delete_category(
    State(db): State<Database>,
    Path(category_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn category_items(
    State(db): State<Database>,
    Path(category_id): Path<i32>,
) -> Result<Json<Vec<Item>>, ApiError> {
    // 404 for an unknown category rather than an empty list
    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound);
    }

    let items = sqlx::query_as::<_, Item>(
        "SELECT * FROM items WHERE category_id = $1 ORDER BY name",
    )
    .bind(category_id)
    .fetch_all(&db)
    .await?;
    Ok(Json(items))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

const ITEM_WITH_CATEGORY: &str = r#"
    SELECT i.id, i.item_no, i.name, i.category_id, c.name AS category_name,
           i.price, i.description, i.stock_quantity, i.created_at, i.updated_at
    FROM items i
    JOIN categories c ON c.id = i.category_id
"#;

pub async fn items_list(State(db): State<Database>) -> Result<Json<Vec<ItemWithCategory>>, ApiError> {
    let query = format!("{ITEM_WITH_CATEGORY} ORDER BY i.name");
    let items = sqlx::query_as::<_, ItemWithCategory>(&query)
        .fetch_all(&db)
        .await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(db): State<Database>,
    Json(payload): Json<CreateItem>,
) -> Result<(StatusCode, Json<ItemWithCategory>), ApiError> {
    let category: Option<i32> = sqlx::query_scalar("SELECT id FROM categories WHERE id = $1")
        .bind(payload.category)
        .fetch_optional(&db)
        .await?;
    if category.is_none() {
        return Err(ApiError::field("category", "Unknown category."));
    }

    let item_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO items (item_no, name, category_id, price, description, stock_quantity)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&payload.item_no)
    .bind(&payload.name)
    .bind(payload.category)
    .bind(payload.price)
    .bind(&payload.description)
    .bind(payload.stock_quantity)
    .fetch_one(&db)
    .await?;

    let item = fetch_item(&db, item_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(db): State<Database>,
    Path(item_id): Path<i32>,
) -> Result<Json<ItemWithCategory>, ApiError> {
    let item = fetch_item(&db, item_id).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(db): State<Database>,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateItem>,
) -> Result<Json<ItemWithCategory>, ApiError> {
    if let Some(category) = payload.category {
        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM categories WHERE id = $1")
            .bind(category)
            .fetch_optional(&db)
            .await?;
        if exists.is_none() {
            return Err(ApiError::field("category", "Unknown category."));
        }
    }

    // Partial update: absent fields keep their stored values
    let updated = sqlx::query(
        r#"
        UPDATE items
        SET item_no = COALESCE($1, item_no),
            name = COALESCE($2, name),
            category_id = COALESCE($3, category_id),
            price = COALESCE($4, price),
            description = COALESCE($5, description),
            stock_quantity = COALESCE($6, stock_quantity),
            updated_at = NOW()
        WHERE id = $7
        "#,
    )
    .bind(&payload.item_no)
    .bind(&payload.name)
    .bind(payload.category)
    .bind(payload.price)
    .bind(&payload.description)
    .bind(payload.stock_quantity)
    .bind(item_id)
    .execute(&db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }

    let item = fetch_item(&db, item_id).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(db): State<Database>,
    Path(item_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(item_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_item(db: &Database, item_id: i32) -> Result<ItemWithCategory, ApiError> {
    let query = format!("{ITEM_WITH_CATEGORY} WHERE i.id = $1");
    sqlx::query_as::<_, ItemWithCategory>(&query)
        .bind(item_id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::NotFound)
}
