//! Sequential identifier rendering for clients, tickets and orders, plus
//! random tracking numbers for shipments.
//!
//! Callers pass the identifier of the most recently inserted row (fetched
//! with `ORDER BY <insertion key> DESC LIMIT 1`); these functions only parse
//! and re-render. The read-then-insert sequence is not serialized against
//! concurrent creations, so two simultaneous inserts can compute the same
//! next identifier and one of them will trip the UNIQUE constraint. That is
//! the accepted behavior for this low-volume tool.

use rand::Rng;

/// Next client id: `"24"` prefix plus a zero-padded 3-digit tail,
/// starting at `24001`.
pub fn next_client_id(last: Option<&str>) -> String {
    match last
        .and_then(|id| id.get(2..))
        .and_then(|tail| tail.parse::<u32>().ok())
    {
        Some(seq) => format!("24{:03}", seq + 1),
        None => "24001".to_string(),
    }
}

/// Next support ticket id: `CS-<n>`, starting at `CS-24001`.
pub fn next_ticket_id(last: Option<&str>) -> String {
    let seq = last
        .and_then(|id| id.split('-').nth(1))
        .and_then(|tail| tail.parse::<u64>().ok())
        .unwrap_or(24000);
    format!("CS-{}", seq + 1)
}

/// Next order number: `OTN-<n>` with a zero-padded 6-digit tail,
/// starting at `OTN-000001`.
pub fn next_order_number(last: Option<&str>) -> String {
    let seq = last
        .and_then(|number| number.rsplit('-').next())
        .and_then(|tail| tail.parse::<u32>().ok())
        .unwrap_or(0);
    format!("OTN-{:06}", seq + 1)
}

/// 12 uppercase hex characters drawn from a thread-local RNG. No uniqueness
/// retry: 2^48 values are enough headroom, and a collision surfaces through
/// the column's UNIQUE constraint.
pub fn generate_tracking_number() -> String {
    let value = rand::thread_rng().gen::<u64>() & 0xFFFF_FFFF_FFFF;
    format!("{:012X}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ids_start_at_24001() {
        assert_eq!(next_client_id(None), "24001");
    }

    #[test]
    fn client_ids_increment_the_numeric_tail() {
        assert_eq!(next_client_id(Some("24001")), "24002");
        assert_eq!(next_client_id(Some("24041")), "24042");
        // past three digits the tail simply grows
        assert_eq!(next_client_id(Some("24999")), "241000");
    }

    #[test]
    fn client_id_falls_back_on_garbage() {
        assert_eq!(next_client_id(Some("??")), "24001");
        assert_eq!(next_client_id(Some("")), "24001");
    }

    #[test]
    fn ticket_ids_run_from_24001() {
        let mut last: Option<String> = None;
        for n in 1..=25u64 {
            let id = next_ticket_id(last.as_deref());
            assert_eq!(id, format!("CS-{}", 24000 + n));
            last = Some(id);
        }
    }

    #[test]
    fn ticket_id_falls_back_on_garbage() {
        assert_eq!(next_ticket_id(Some("nonsense")), "CS-24001");
    }

    #[test]
    fn order_numbers_are_zero_padded_and_sequential() {
        let mut last: Option<String> = None;
        for n in 1..=12u32 {
            let number = next_order_number(last.as_deref());
            assert_eq!(number, format!("OTN-{:06}", n));
            last = Some(number);
        }
    }

    #[test]
    fn order_number_padding_survives_large_sequences() {
        assert_eq!(next_order_number(Some("OTN-000999")), "OTN-001000");
        assert_eq!(next_order_number(Some("OTN-999999")), "OTN-1000000");
    }

    #[test]
    fn tracking_numbers_are_twelve_uppercase_hex_chars() {
        for _ in 0..100 {
            let tn = generate_tracking_number();
            assert_eq!(tn.len(), 12);
            assert!(tn.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }
}
