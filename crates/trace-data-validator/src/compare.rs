//! Stream comparison of two decoded trace dumps.
//!
//! Each side is walked by its own [`EventCursor`], which folds packet-info
//! records into a running "current packet info" and yields events only.
//! Event pairs are then compared in order, together with the packet info in
//! effect on each side. Packet boundaries do not need to sit at the same
//! positions on both sides; only the effective packet info per event pair
//! matters.

use std::fmt;

use log::{debug, info, trace};

use crate::field::{equal_opt, Field};
use crate::record::{Event, PacketInfo, Record};

static NO_PACKET_INFO: PacketInfo = PacketInfo {
    header: None,
    context: None,
};

// ── Cursor ──────────────────────────────────────────────────────────────────

/// An event together with the packet info in effect for it.
#[derive(Debug, Clone, Copy)]
pub struct CursorEvent<'a> {
    /// Position of the event in its record list.
    pub entry: usize,
    pub packet_info: &'a PacketInfo,
    pub event: &'a Event,
}

/// Iterator over the events of one record stream.
///
/// Every step consumes at least one record, so a cursor over `n` records
/// yields at most `n` events and always terminates.
#[derive(Debug, Clone)]
pub struct EventCursor<'a> {
    records: std::iter::Enumerate<std::slice::Iter<'a, Record>>,
    current: &'a PacketInfo,
}

impl<'a> EventCursor<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self {
            records: records.iter().enumerate(),
            current: &NO_PACKET_INFO,
        }
    }
}

impl<'a> Iterator for EventCursor<'a> {
    type Item = CursorEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (entry, record) in self.records.by_ref() {
            match record {
                Record::PacketInfo(info) => {
                    trace!("entry {entry}: packet info replaced");
                    self.current = info;
                }
                Record::Event(event) => {
                    return Some(CursorEvent {
                        entry,
                        packet_info: self.current,
                        event,
                    });
                }
            }
        }
        None
    }
}

// ── Mismatch ────────────────────────────────────────────────────────────────

/// What made two streams differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// The expected stream ran out of events first.
    ExpectedExhausted,
    /// The output stream ran out of events first.
    OutputExhausted,
    PacketHeader,
    PacketContext,
    Header,
    StreamContext,
    Context,
    Payload,
}

impl MismatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::ExpectedExhausted => "expected stream has fewer events",
            MismatchKind::OutputExhausted => "output stream has fewer events",
            MismatchKind::PacketHeader => "packet-header",
            MismatchKind::PacketContext => "packet-context",
            MismatchKind::Header => "header",
            MismatchKind::StreamContext => "stream-context",
            MismatchKind::Context => "context",
            MismatchKind::Payload => "payload",
        }
    }
}

/// The first point where two streams diverge.
#[derive(Debug, Clone)]
pub struct Mismatch {
    /// Ordinal of the event pair being compared (0-based).
    pub event_index: usize,
    pub kind: MismatchKind,
    /// Record positions of the compared events, when present.
    pub expected_entry: Option<usize>,
    pub output_entry: Option<usize>,
    /// The differing values. Both `None` for exhaustion.
    pub expected: Option<Field>,
    pub output: Option<Field>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::ExpectedExhausted | MismatchKind::OutputExhausted => {
                write!(f, "event {}: {}", self.event_index, self.kind.as_str())?;
                if let Some(entry) = self.expected_entry.or(self.output_entry) {
                    write!(f, " (unmatched entry {entry})")?;
                }
                Ok(())
            }
            _ => {
                writeln!(
                    f,
                    "event {}: {} differs",
                    self.event_index,
                    self.kind.as_str()
                )?;
                writeln!(
                    f,
                    "  expected: {}",
                    DisplayOpt(self.expected.as_ref(), self.expected_entry)
                )?;
                write!(
                    f,
                    "  output:   {}",
                    DisplayOpt(self.output.as_ref(), self.output_entry)
                )
            }
        }
    }
}

struct DisplayOpt<'a>(Option<&'a Field>, Option<usize>);

impl fmt::Display for DisplayOpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(field) => write!(f, "{field}")?,
            None => f.write_str("<absent>")?,
        }
        if let Some(entry) = self.1 {
            write!(f, " [entry {entry}]")?;
        }
        Ok(())
    }
}

// ── Compare ─────────────────────────────────────────────────────────────────

/// Returns `true` when both streams hold matching events under matching
/// packet info.
pub fn compare(expected: &[Record], output: &[Record]) -> bool {
    find_mismatch(expected, output).is_none()
}

/// Returns the first divergence between the two streams, if any.
pub fn find_mismatch(expected: &[Record], output: &[Record]) -> Option<Mismatch> {
    let mut expected_events = EventCursor::new(expected);
    let mut output_events = EventCursor::new(output);
    let mut event_index = 0;

    loop {
        let (exp, out) = match (expected_events.next(), output_events.next()) {
            (None, None) => {
                info!("{event_index} event(s) matched");
                return None;
            }
            (Some(exp), None) => {
                debug!("output ended before expected entry {}", exp.entry);
                return Some(exhausted(
                    event_index,
                    MismatchKind::OutputExhausted,
                    Some(exp.entry),
                    None,
                ));
            }
            (None, Some(out)) => {
                debug!("expected ended before output entry {}", out.entry);
                return Some(exhausted(
                    event_index,
                    MismatchKind::ExpectedExhausted,
                    None,
                    Some(out.entry),
                ));
            }
            (Some(exp), Some(out)) => (exp, out),
        };

        debug!(
            "comparing event {event_index}: expected entry {}, output entry {}",
            exp.entry, out.entry
        );
        if let Some(mismatch) = diff_events(event_index, &exp, &out) {
            debug!("mismatch at event {event_index}: {}", mismatch.kind.as_str());
            return Some(mismatch);
        }
        event_index += 1;
    }
}

fn exhausted(
    event_index: usize,
    kind: MismatchKind,
    expected_entry: Option<usize>,
    output_entry: Option<usize>,
) -> Mismatch {
    Mismatch {
        event_index,
        kind,
        expected_entry,
        output_entry,
        expected: None,
        output: None,
    }
}

const PACKET_PARTS: [MismatchKind; 2] = [
    MismatchKind::PacketHeader,
    MismatchKind::PacketContext,
];

const EVENT_PARTS: [MismatchKind; 4] = [
    MismatchKind::Header,
    MismatchKind::StreamContext,
    MismatchKind::Context,
    MismatchKind::Payload,
];

fn diff_events(
    event_index: usize,
    exp: &CursorEvent<'_>,
    out: &CursorEvent<'_>,
) -> Option<Mismatch> {
    let packet = PACKET_PARTS
        .into_iter()
        .zip(exp.packet_info.parts().into_iter().zip(out.packet_info.parts()));
    let event = EVENT_PARTS
        .into_iter()
        .zip(exp.event.parts().into_iter().zip(out.event.parts()));

    packet
        .chain(event)
        .find(|(_, ((_, a), (_, b)))| !equal_opt(*a, *b))
        .map(|(kind, ((_, a), (_, b)))| Mismatch {
            event_index,
            kind,
            expected_entry: Some(exp.entry),
            output_entry: Some(out.entry),
            expected: a.cloned(),
            output: b.cloned(),
        })
}
