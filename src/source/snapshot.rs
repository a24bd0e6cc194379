//! The payload returned by the poll endpoint.

use serde_json::{Map, Value};

/// One poll's worth of data: an arbitrarily nested JSON object.
pub type Snapshot = Map<String, Value>;

/// Parse a snapshot, rejecting anything that is not a JSON object.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_snapshot() {
        let json = br#"{
            "shelly3em": { "shellies/shellyem3": { "emeter/0/power": "230.1" } },
            "opendtu": { "0/power": 412 },
            "calculated": { "new_limit": 600, "last_calculated": 1697040000 }
        }"#;

        let snapshot = parse_snapshot(json).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot["opendtu"]["0/power"], json!(412));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_snapshot(b"[]").is_err());
        assert!(parse_snapshot(b"42").is_err());
        assert!(parse_snapshot(b"").is_err());
    }
}
