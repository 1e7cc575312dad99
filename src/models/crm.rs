use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i32,
    /// Business identifier in the `24NNN` series, assigned once at creation.
    pub client_id: String,
    pub name: String,
    pub company: String,
    pub status: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub company: String,
    #[serde(default = "default_client_status")]
    pub status: String,
    pub address: Option<String>,
}

fn default_client_status() -> String {
    "Prospect".to_string()
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ClientContact {
    pub id: i32,
    #[serde(rename = "client")]
    pub client_id: i32,
    pub contact_number: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientContact {
    pub client: i32,
    pub contact_number: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ClientEmail {
    pub id: i32,
    #[serde(rename = "client")]
    pub client_id: i32,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientEmail {
    pub client: i32,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// `CS-<n>` string primary key, allocated at creation.
    pub id: String,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub subject: String,
    pub description: String,
    #[serde(default = "default_ticket_priority")]
    pub priority: String,
    #[serde(default = "default_ticket_status")]
    pub status: String,
}

// Updates carry the full field set; the id itself is never client-supplied.
#[derive(Debug, Deserialize)]
pub struct UpdateTicket {
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
}

fn default_ticket_priority() -> String {
    "Low".to_string()
}

fn default_ticket_status() -> String {
    "Open".to_string()
}
