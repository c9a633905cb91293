//! Sampled event buffer (spec §4.5). Nodes append events as they update;
//! each node remembers the half-open `[start, end)` range of indices it
//! produced so it can later mark that range ignored (state exited) or from
//! an inactive branch (layer with `ignore_events` set, or a losing side of a
//! blend).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    StateEntry,
    StateExecute,
    StateExit,
    Timed,
    AnimationClip,
}

#[derive(Debug, Clone)]
pub struct SampledEvent {
    pub origin: EventOrigin,
    pub origin_node_id: u16,
    pub payload: String,
    pub is_from_active_branch: bool,
    pub is_ignored: bool,
}

impl SampledEvent {
    pub fn new(origin: EventOrigin, origin_node_id: u16, payload: impl Into<String>) -> Self {
        Self {
            origin,
            origin_node_id,
            payload: payload.into(),
            is_from_active_branch: true,
            is_ignored: false,
        }
    }
}

/// Half-open range of indices into a `SampledEventBuffer`, as returned by a
/// pose node's `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRange {
    pub start: usize,
    pub end: usize,
}

impl EventRange {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct SampledEventBuffer {
    events: Vec<SampledEvent>,
}

impl SampledEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.events.clear();
    }

    pub fn append(&mut self, event: SampledEvent) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    pub fn begin_range(&self) -> usize {
        self.events.len()
    }

    pub fn close_range(&self, start: usize) -> EventRange {
        EventRange {
            start,
            end: self.events.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[SampledEvent] {
        &self.events
    }

    /// Marks state-entry/execute/exit events in `range` as ignored, leaving
    /// timed and animation-clip events untouched — used when a state
    /// transitions out so consumers don't see stale lifecycle events.
    pub fn mark_only_state_events_as_ignored(&mut self, range: EventRange) {
        for event in &mut self.events[range.start..range.end] {
            if matches!(
                event.origin,
                EventOrigin::StateEntry | EventOrigin::StateExecute | EventOrigin::StateExit
            ) {
                event.is_ignored = true;
            }
        }
    }

    pub fn mark_events_as_from_inactive_branch(&mut self, range: EventRange) {
        for event in &mut self.events[range.start..range.end] {
            event.is_from_active_branch = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_tracks_appended_events() {
        let mut buffer = SampledEventBuffer::new();
        let start = buffer.begin_range();
        buffer.append(SampledEvent::new(EventOrigin::Timed, 1, "foo"));
        buffer.append(SampledEvent::new(EventOrigin::Timed, 1, "bar"));
        let range = buffer.close_range(start);
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 2);
    }

    #[test]
    fn mark_only_state_events_leaves_timed_events_alone() {
        let mut buffer = SampledEventBuffer::new();
        buffer.append(SampledEvent::new(EventOrigin::StateExit, 1, "exit"));
        buffer.append(SampledEvent::new(EventOrigin::Timed, 1, "timed"));
        let range = EventRange { start: 0, end: 2 };
        buffer.mark_only_state_events_as_ignored(range);
        assert!(buffer.events()[0].is_ignored);
        assert!(!buffer.events()[1].is_ignored);
    }

    #[test]
    fn mark_inactive_branch_affects_whole_range() {
        let mut buffer = SampledEventBuffer::new();
        buffer.append(SampledEvent::new(EventOrigin::AnimationClip, 2, "footstep"));
        let range = EventRange { start: 0, end: 1 };
        buffer.mark_events_as_from_inactive_branch(range);
        assert!(!buffer.events()[0].is_from_active_branch);
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buffer = SampledEventBuffer::new();
        buffer.append(SampledEvent::new(EventOrigin::Timed, 1, "x"));
        buffer.reset();
        assert!(buffer.is_empty());
    }
}
