//! Sync tracks (spec §4.4's "Node contract"), grounded in
//! `Code/Engine/Animation/AnimationSyncTrack.h`. A pose node exposes named
//! "sync events" spread over its normalized duration `[0,1)`; synchronized
//! blends (transitions, layer state machines) align two nodes by event index
//! and percentage-through rather than by raw time, so a fast and a slow clip
//! with matching footstep events stay in step.

#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub id: String,
    /// Normalized start time in `[0, 1)`.
    pub start_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncTime {
    pub event_index: usize,
    pub percentage_through: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SyncTrack {
    /// Sorted ascending by `start_time`.
    events: Vec<SyncEvent>,
}

impl SyncTrack {
    pub fn new(mut events: Vec<SyncEvent>) -> Self {
        events.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());
        Self { events }
    }

    /// A track with a single implicit event spanning the whole duration —
    /// used by nodes with no explicit sync markup (most leaf clips).
    pub fn unsynchronized() -> Self {
        Self {
            events: vec![SyncEvent {
                id: "default".into(),
                start_time: 0.0,
            }],
        }
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    pub fn event_id(&self, index: usize) -> &str {
        &self.events[index].id
    }

    pub fn event_start_time(&self, index: usize) -> f32 {
        self.events[index].start_time
    }

    fn event_end_time(&self, index: usize) -> f32 {
        if index + 1 < self.events.len() {
            self.events[index + 1].start_time
        } else {
            1.0
        }
    }

    /// Converts a normalized position through the track's duration into a
    /// `SyncTime`: the event it falls within plus the percentage through
    /// that event's span.
    pub fn time_to_sync_time(&self, percentage_through_track: f32) -> SyncTime {
        debug_assert!(!self.events.is_empty());
        let t = percentage_through_track.clamp(0.0, 0.999_999);

        let mut event_index = 0;
        for (i, event) in self.events.iter().enumerate() {
            if event.start_time <= t {
                event_index = i;
            } else {
                break;
            }
        }

        let span = (self.event_end_time(event_index) - self.event_start_time(event_index)).max(1e-6);
        let percentage_through = (t - self.event_start_time(event_index)) / span;

        SyncTime {
            event_index,
            percentage_through: percentage_through.clamp(0.0, 1.0),
        }
    }

    /// The inverse of `time_to_sync_time`: recovers a normalized track
    /// position from an event index and percentage through it.
    pub fn sync_time_to_percentage(&self, sync: SyncTime) -> f32 {
        let start = self.event_start_time(sync.event_index);
        let span = self.event_end_time(sync.event_index) - start;
        start + span * sync.percentage_through
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_event_track() -> SyncTrack {
        SyncTrack::new(vec![
            SyncEvent {
                id: "step_left".into(),
                start_time: 0.0,
            },
            SyncEvent {
                id: "step_right".into(),
                start_time: 0.5,
            },
        ])
    }

    #[test]
    fn time_to_sync_time_picks_containing_event() {
        let track = two_event_track();
        let sync = track.time_to_sync_time(0.6);
        assert_eq!(sync.event_index, 1);
        assert!((sync.percentage_through - 0.2).abs() < 1e-4);
    }

    #[test]
    fn sync_time_round_trips_through_percentage() {
        let track = two_event_track();
        let sync = track.time_to_sync_time(0.25);
        let recovered = track.sync_time_to_percentage(sync);
        assert!((recovered - 0.25).abs() < 1e-4);
    }

    #[test]
    fn unsynchronized_track_has_single_event() {
        let track = SyncTrack::unsynchronized();
        assert_eq!(track.num_events(), 1);
        let sync = track.time_to_sync_time(0.75);
        assert_eq!(sync.event_index, 0);
        assert!((sync.percentage_through - 0.75).abs() < 1e-4);
    }
}
