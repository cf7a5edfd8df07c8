use derive_new::new;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Event as it travels on the domain event stream.
///
/// `payload` and `metadata` stay as the JSON text written by the event store so
/// consumers only decode the aggregates they care about.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct DomainEvent {
    pub id: String,
    pub aggregate_type: String,
    pub sequence: usize,
    pub event_type: String,
    pub event_version: String,
    pub payload: String,
    pub metadata: String,
}

impl DomainEvent {
    pub fn decode_payload<E: DeserializeOwned>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    pub fn is_aggregate(&self, aggregate_type: &str) -> bool {
        self.aggregate_type == aggregate_type
    }
}

/// Row layout of the dynamo-es event log table, as seen on DynamoDB Streams.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventLogRecord {
    pub aggregate_type_and_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    #[serde(with = "serde_bytes")]
    pub metadata: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
    pub event_version: String,
    pub aggregate_id_sequence: usize,
}

impl TryFrom<EventLogRecord> for DomainEvent {
    type Error = String;

    fn try_from(record: EventLogRecord) -> Result<Self, Self::Error> {
        let payload = String::from_utf8(record.payload)
            .map_err(|e| format!("Invalid payload UTF-8: {}", e))?;
        let metadata = String::from_utf8(record.metadata)
            .map_err(|e| format!("Invalid metadata UTF-8: {}", e))?;

        Ok(DomainEvent::new(
            record.aggregate_id,
            record.aggregate_type,
            record.aggregate_id_sequence,
            record.event_type,
            record.event_version,
            payload,
            metadata,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(payload: Vec<u8>) -> EventLogRecord {
        EventLogRecord {
            aggregate_type_and_id: "Quote:01J".into(),
            event_type: "Quote:Approved".into(),
            aggregate_id: "01J".into(),
            aggregate_type: "Quote".into(),
            metadata: br#"{"command_id":"c1"}"#.to_vec(),
            payload,
            event_version: "1.0".into(),
            aggregate_id_sequence: 4,
        }
    }

    #[test]
    fn converts_log_record() {
        let event = DomainEvent::try_from(record(br#"{"type":"QuoteApproved"}"#.to_vec())).unwrap();
        assert_eq!(event.id, "01J");
        assert_eq!(event.sequence, 4);
        assert!(event.is_aggregate("Quote"));

        let payload: serde_json::Value = event.decode_payload().unwrap();
        assert_eq!(payload["type"], "QuoteApproved");
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let err = DomainEvent::try_from(record(vec![0xff, 0xfe])).unwrap_err();
        assert!(err.starts_with("Invalid payload UTF-8"));
    }
}
