use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Warehouse {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: Option<String>,
    pub capacity: i32,
    pub current_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicle {
    pub license_plate: Option<String>,
    pub capacity: i32,
    pub current_location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub customer_name: String,
    #[serde(rename = "warehouse")]
    pub warehouse_id: Option<i32>,
    #[serde(rename = "vehicle")]
    pub vehicle_id: Option<i32>,
    #[serde(rename = "item")]
    pub item_id: Option<i32>,
    pub order_date: DateTime<Utc>,
    pub status: String,
    /// `OTN-NNNNNN`, allocated at creation and immutable afterwards.
    pub order_number: String,
    pub delivery_address: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub customer_name: String,
    pub warehouse: Option<i32>,
    pub vehicle: Option<i32>,
    pub item: Option<i32>,
    pub delivery_address: String,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default = "default_order_status")]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrder {
    pub customer_name: String,
    pub warehouse: Option<i32>,
    pub vehicle: Option<i32>,
    pub item: Option<i32>,
    pub delivery_address: String,
    pub total_amount: Decimal,
    pub status: String,
}

fn default_order_status() -> String {
    "pending".to_string()
}

/// Order/shipment state machine: `pending → shipped → {delivered, failed}`,
/// `pending → canceled`. Terminal states allow no further transition.
pub fn can_transition(from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        ("pending", "shipped") | ("pending", "canceled") | ("shipped", "delivered") | ("shipped", "failed")
    )
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    pub id: i32,
    #[serde(rename = "order")]
    pub order_id: Option<i32>,
    #[serde(rename = "vehicle")]
    pub vehicle_id: Option<i32>,
    pub tracking_number: String,
    pub status: String,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProofOfDelivery {
    pub shipment: Option<i32>,
    pub delivery_status: Option<String>,
    pub failed_reason: Option<String>,
    pub delivered_by: Option<String>,
    pub notes: Option<String>,
}

/// A proof payload that passed validation.
#[derive(Debug, PartialEq)]
pub struct ValidProof {
    pub shipment: i32,
    pub delivered: bool,
    pub failed_reason: Option<String>,
    pub delivered_by: Option<String>,
    pub notes: Option<String>,
}

impl ValidProof {
    pub fn status(&self) -> &'static str {
        if self.delivered {
            "delivered"
        } else {
            "failed"
        }
    }
}

impl CreateProofOfDelivery {
    /// Field-keyed validation, run before any write: `failed_reason` is
    /// mandatory exactly when the outcome is `failed`.
    pub fn validate(&self) -> Result<ValidProof, BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        if self.shipment.is_none() {
            errors.insert("shipment".to_string(), "This field is required.".to_string());
        }

        let delivered = match self.delivery_status.as_deref() {
            Some("delivered") => Some(true),
            Some("failed") => Some(false),
            Some(_) => {
                errors.insert(
                    "delivery_status".to_string(),
                    "Must be one of 'delivered' or 'failed'.".to_string(),
                );
                None
            }
            None => {
                errors.insert("delivery_status".to_string(), "This field is required.".to_string());
                None
            }
        };

        let failed_reason = self
            .failed_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);

        if delivered == Some(false) && failed_reason.is_none() {
            errors.insert(
                "failed_reason".to_string(),
                "This field is required when delivery status is 'failed'.".to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidProof {
            shipment: self.shipment.unwrap_or_default(),
            delivered: delivered.unwrap_or_default(),
            failed_reason,
            delivered_by: self.delivered_by.clone(),
            notes: self.notes.clone(),
        })
    }
}

/// Read-side projection for proof-of-delivery retrieval, with display fields
/// pulled from the linked order, warehouse and vehicle. Absent relations
/// surface as "N/A".
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProofOfDeliveryDisplay {
    pub id: i32,
    pub tracking_number: String,
    pub delivery_status: String,
    pub failed_reason: String,
    pub delivered_by: String,
    pub customer_name: String,
    pub order_number: String,
    pub warehouse_name: String,
    pub vehicle_plate: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        shipment: Option<i32>,
        delivery_status: Option<&str>,
        failed_reason: Option<&str>,
    ) -> CreateProofOfDelivery {
        CreateProofOfDelivery {
            shipment,
            delivery_status: delivery_status.map(str::to_string),
            failed_reason: failed_reason.map(str::to_string),
            delivered_by: None,
            notes: None,
        }
    }

    #[test]
    fn delivered_proof_passes_without_a_reason() {
        let proof = payload(Some(7), Some("delivered"), None).validate().unwrap();
        assert_eq!(proof.shipment, 7);
        assert!(proof.delivered);
        assert_eq!(proof.status(), "delivered");
    }

    #[test]
    fn failed_proof_requires_a_reason() {
        let errors = payload(Some(7), Some("failed"), None).validate().unwrap_err();
        assert_eq!(
            errors.get("failed_reason").map(String::as_str),
            Some("This field is required when delivery status is 'failed'.")
        );
    }

    #[test]
    fn whitespace_reason_counts_as_missing() {
        let errors = payload(Some(7), Some("failed"), Some("   ")).validate().unwrap_err();
        assert!(errors.contains_key("failed_reason"));
    }

    #[test]
    fn failed_proof_with_reason_passes() {
        let proof = payload(Some(7), Some("failed"), Some("nobody home"))
            .validate()
            .unwrap();
        assert!(!proof.delivered);
        assert_eq!(proof.status(), "failed");
        assert_eq!(proof.failed_reason.as_deref(), Some("nobody home"));
    }

    #[test]
    fn unknown_status_and_missing_shipment_are_both_reported() {
        let errors = payload(None, Some("lost"), None).validate().unwrap_err();
        assert!(errors.contains_key("shipment"));
        assert!(errors.contains_key("delivery_status"));
    }

    #[test]
    fn status_transitions_follow_the_lifecycle() {
        assert!(can_transition("pending", "shipped"));
        assert!(can_transition("pending", "canceled"));
        assert!(can_transition("shipped", "delivered"));
        assert!(can_transition("shipped", "failed"));
        // no transition out of terminal states
        assert!(!can_transition("delivered", "shipped"));
        assert!(!can_transition("failed", "pending"));
        assert!(!can_transition("canceled", "shipped"));
        // and no skipping the shipped stage
        assert!(!can_transition("pending", "delivered"));
        // idempotent writes of the same status are allowed
        assert!(can_transition("shipped", "shipped"));
    }
}
