//! Top-level trace records: packet metadata and events.

use crate::field::Field;

/// Packet boundary metadata. Stays in effect for the events that follow it
/// until the next packet info on the same stream replaces it.
#[derive(Debug, Clone, Default)]
pub struct PacketInfo {
    pub header: Option<Field>,
    pub context: Option<Field>,
}

impl PacketInfo {
    /// The packet info's parts in comparison order, labelled by their entry
    /// key.
    pub fn parts(&self) -> [(&'static str, Option<&Field>); 2] {
        [
            ("packet-header", self.header.as_ref()),
            ("packet-context", self.context.as_ref()),
        ]
    }
}

/// One trace event. Any part may be absent when the source entry lacked
/// the corresponding key.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub header: Option<Field>,
    pub stream_context: Option<Field>,
    pub context: Option<Field>,
    pub payload: Option<Field>,
}

impl Event {
    /// The event's parts in comparison order, labelled by their entry key.
    pub fn parts(&self) -> [(&'static str, Option<&Field>); 4] {
        [
            ("header", self.header.as_ref()),
            ("stream-context", self.stream_context.as_ref()),
            ("context", self.context.as_ref()),
            ("payload", self.payload.as_ref()),
        ]
    }
}

/// A decoded top-level entry.
#[derive(Debug, Clone)]
pub enum Record {
    PacketInfo(PacketInfo),
    Event(Event),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_info_parts_follow_entry_keys() {
        let info = PacketInfo {
            header: None,
            context: Some(Field::Integer(4)),
        };
        let parts = info.parts();
        assert_eq!(parts[0].0, "packet-header");
        assert!(parts[0].1.is_none());
        assert_eq!(parts[1].0, "packet-context");
        assert!(matches!(parts[1].1, Some(Field::Integer(4))));
    }

    #[test]
    fn event_parts_follow_entry_keys() {
        let event = Event {
            stream_context: Some(Field::Ignore),
            ..Event::default()
        };
        let keys: Vec<&str> = event.parts().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["header", "stream-context", "context", "payload"]);
        let present: Vec<bool> = event.parts().iter().map(|(_, f)| f.is_some()).collect();
        assert_eq!(present, vec![false, true, false, false]);
    }
}
