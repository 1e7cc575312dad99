use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    database::Database,
    error::ApiError,
    ids,
    models::{
        Client, ClientContact, ClientEmail, CreateClient, CreateClientContact, CreateClientEmail,
        CreateTicket, Ticket, UpdateTicket,
    },
};

const CLIENT_STATUSES: [&str; 4] = ["Prospect", "New", "Regular", "Key"];
const TICKET_PRIORITIES: [&str; 4] = ["Low", "Medium", "High", "Urgent"];
const TICKET_STATUSES: [&str; 3] = ["Open", "In Progress", "Closed"];

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

pub async fn clients_list(State(db): State<Database>) -> Result<Json<Vec<Client>>, ApiError> {
    let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY id")
        .fetch_all(&db)
        .await?;
    Ok(Json(clients))
}

pub async fn create_client(
    State(db): State<Database>,
    Json(payload): Json<CreateClient>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    if !CLIENT_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    // Allocate the next id in the 24NNN series off the latest row. Not
    // serialized against concurrent creates; see ids.rs.
    let last: Option<String> =
        sqlx::query_scalar("SELECT client_id FROM clients ORDER BY id DESC LIMIT 1")
            .fetch_optional(&db)
            .await?;
    let client_id = ids::next_client_id(last.as_deref());

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (client_id, name, company, status, address)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&client_id)
    .bind(&payload.name)
    .bind(&payload.company)
    .bind(&payload.status)
    .bind(&payload.address)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(db): State<Database>,
    Path(client_pk): Path<i32>,
) -> Result<Json<Client>, ApiError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(client_pk)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(client))
}

pub async fn update_client(
    State(db): State<Database>,
    Path(client_pk): Path<i32>,
    Json(payload): Json<CreateClient>,
) -> Result<Json<Client>, ApiError> {
    if !CLIENT_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    // client_id is assigned once and never rewritten
    let client = sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients
        SET name = $1, company = $2, status = $3, address = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.company)
    .bind(&payload.status)
    .bind(&payload.address)
    .bind(client_pk)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(client))
}

pub async fn delete_client(
    State(db): State<Database>,
    Path(client_pk): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(client_pk)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Client contact numbers / emails
// ---------------------------------------------------------------------------

pub async fn contacts_list(State(db): State<Database>) -> Result<Json<Vec<ClientContact>>, ApiError> {
    let contacts = sqlx::query_as::<_, ClientContact>(
        "SELECT id, client_id, contact_number FROM client_contacts ORDER BY id",
    )
    .fetch_all(&db)
    .await?;
    Ok(Json(contacts))
}

pub async fn create_contact(
    State(db): State<Database>,
    Json(payload): Json<CreateClientContact>,
) -> Result<(StatusCode, Json<ClientContact>), ApiError> {
    let contact = sqlx::query_as::<_, ClientContact>(
        r#"
        INSERT INTO client_contacts (client_id, contact_number)
        VALUES ($1, $2)
        RETURNING id, client_id, contact_number
        "#,
    )
    .bind(payload.client)
    .bind(&payload.contact_number)
    .fetch_one(&db)
    .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn delete_contact(
    State(db): State<Database>,
    Path(contact_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM client_contacts WHERE id = $1")
        .bind(contact_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn emails_list(State(db): State<Database>) -> Result<Json<Vec<ClientEmail>>, ApiError> {
    let emails = sqlx::query_as::<_, ClientEmail>(
        "SELECT id, client_id, email FROM client_emails ORDER BY id",
    )
    .fetch_all(&db)
    .await?;
    Ok(Json(emails))
}

pub async fn create_email(
    State(db): State<Database>,
    Json(payload): Json<CreateClientEmail>,
) -> Result<(StatusCode, Json<ClientEmail>), ApiError> {
    let email = sqlx::query_as::<_, ClientEmail>(
        r#"
        INSERT INTO client_emails (client_id, email)
        VALUES ($1, $2)
        RETURNING id, client_id, email
        "#,
    )
    .bind(payload.client)
    .bind(&payload.email)
    .fetch_one(&db)
    .await?;
    Ok((StatusCode::CREATED, Json(email)))
}

pub async fn delete_email(
    State(db): State<Database>,
    Path(email_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM client_emails WHERE id = $1")
        .bind(email_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Support tickets
// ---------------------------------------------------------------------------

pub async fn tickets_list(State(db): State<Database>) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets ORDER BY created_at")
        .fetch_all(&db)
        .await?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(db): State<Database>,
    Json(payload): Json<CreateTicket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    if !TICKET_PRIORITIES.contains(&payload.priority.as_str()) {
        return Err(ApiError::field("priority", "Invalid priority."));
    }
    if !TICKET_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    // The string id is the primary key, so insertion order comes from
    // created_at rather than the id's lexicographic order.
    let last: Option<String> =
        sqlx::query_scalar("SELECT id FROM tickets ORDER BY created_at DESC, id DESC LIMIT 1")
            .fetch_optional(&db)
            .await?;
    let ticket_id = ids::next_ticket_id(last.as_deref());

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (id, subject, description, priority, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&ticket_id)
    .bind(&payload.subject)
    .bind(&payload.description)
    .bind(&payload.priority)
    .bind(&payload.status)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(db): State<Database>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
        .bind(&ticket_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ticket))
}

pub async fn update_ticket(
    State(db): State<Database>,
    Path(ticket_id): Path<String>,
    Json(payload): Json<UpdateTicket>,
) -> Result<Json<Ticket>, ApiError> {
    if !TICKET_PRIORITIES.contains(&payload.priority.as_str()) {
        return Err(ApiError::field("priority", "Invalid priority."));
    }
    if !TICKET_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::field("status", "Invalid status."));
    }

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET subject = $1, description = $2, priority = $3, status = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&payload.subject)
    .bind(&payload.description)
    .bind(&payload.priority)
    .bind(&payload.status)
    .bind(&ticket_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(ticket))
}

pub async fn delete_ticket(
    State(db): State<Database>,
    Path(ticket_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(&ticket_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
