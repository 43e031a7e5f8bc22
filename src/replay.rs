use crate::events::Event;

/// In-memory history of observed events with a bidirectional cursor.
/// Because every stored event carries deep-copied board and domain data,
/// replaying is a pure cache read: neither direction touches or re-invokes
/// the live instance.
#[derive(Debug, Default)]
pub struct ReplayBuffer {
    events: Vec<Event>,
    // One past the index of the current event; 0 means nothing delivered.
    cursor: usize,
}

impl ReplayBuffer {
    pub fn new() -> Self {
        ReplayBuffer::default()
    }

    /// Appends a freshly observed event and moves the cursor to the live
    /// edge.
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
        self.cursor = self.events.len();
    }

    /// The event at the cursor, if anything has been delivered.
    pub fn current(&self) -> Option<&Event> {
        if self.cursor == 0 {
            None
        } else {
            Some(&self.events[self.cursor - 1])
        }
    }

    /// The most recently recorded event, regardless of cursor position.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Steps the cursor back one event; clamps at the first event.
    pub fn back(&mut self) -> Option<&Event> {
        if self.cursor > 1 {
            self.cursor -= 1;
            Some(&self.events[self.cursor - 1])
        } else {
            None
        }
    }

    /// Steps the cursor forward one event; clamps at the live edge.
    pub fn forward(&mut self) -> Option<&Event> {
        if self.cursor < self.events.len() {
            self.cursor += 1;
            Some(&self.events[self.cursor - 1])
        } else {
            None
        }
    }

    pub fn at_live_edge(&self) -> bool {
        self.cursor == self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn logs(n: usize) -> Vec<Event> {
        (0..n).map(|i| Event::Log { message: format!("event {}", i) }).collect()
    }

    #[test]
    fn test_record_tracks_live_edge() {
        let mut buffer = ReplayBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.current(), None);
        for event in logs(3) {
            buffer.record(event);
            assert!(buffer.at_live_edge());
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.current(), Some(&Event::Log { message: "event 2".into() }));
    }

    #[test]
    fn test_back_and_forward_clamp() {
        let mut buffer = ReplayBuffer::new();
        for event in logs(3) {
            buffer.record(event);
        }
        assert_eq!(buffer.back(), Some(&Event::Log { message: "event 1".into() }));
        assert_eq!(buffer.back(), Some(&Event::Log { message: "event 0".into() }));
        // Clamped at the first delivered event.
        assert_eq!(buffer.back(), None);
        assert_eq!(buffer.current(), Some(&Event::Log { message: "event 0".into() }));
        assert_eq!(buffer.forward(), Some(&Event::Log { message: "event 1".into() }));
        assert_eq!(buffer.forward(), Some(&Event::Log { message: "event 2".into() }));
        assert_eq!(buffer.forward(), None);
        assert!(buffer.at_live_edge());
    }

    #[test]
    fn test_replay_equivalence() {
        let mut buffer = ReplayBuffer::new();
        let events = logs(5);
        for event in events.clone() {
            buffer.record(event);
        }
        // Walk all the way back, then all the way forward; the forward pass
        // must reproduce the recorded sequence exactly.
        let mut rewound = Vec::new();
        while let Some(event) = buffer.back() {
            rewound.push(event.clone());
        }
        let mut replayed = vec![buffer.current().unwrap().clone()];
        while let Some(event) = buffer.forward() {
            replayed.push(event.clone());
        }
        assert_eq!(replayed, events);
        let mut expected_rewound: Vec<Event> = events[..4].to_vec();
        expected_rewound.reverse();
        assert_eq!(rewound, expected_rewound);
    }
}
