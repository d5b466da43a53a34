use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

pub const ONE_SEC_MS: u64 = 1000;

/// Kinds of work the engine schedules on its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TickKind {
    TryMatch,
    HeartbeatSweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub at_ms: u64,
    pub kind: TickKind,
    /// Periodic ticks reschedule themselves; immediate triggers do not.
    pub periodic: bool,
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        other
            .at_ms
            .cmp(&self.at_ms)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.periodic.cmp(&other.periodic))
    }
}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The tick currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentTick(pub Tick);

/// Millisecond clock the engine runs on. Time only moves forward via
/// [DispatchClock::advance_to]; scheduled ticks become due once `now_ms`
/// reaches their timestamp. The embedding layer maps wall-clock time onto
/// this clock, tests drive it directly.
#[derive(Debug, Default, Resource)]
pub struct DispatchClock {
    now_ms: u64,
    ticks: BinaryHeap<Tick>,
}

impl DispatchClock {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Moves the clock forward. Calls with an earlier timestamp are ignored,
    /// so callers can feed wall-clock readings without ordering them.
    pub fn advance_to(&mut self, now_ms: u64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    /// Schedules a tick at an absolute time, clamped to the present so a
    /// stale timestamp still produces a due tick rather than a lost one.
    pub fn schedule_at(&mut self, at_ms: u64, kind: TickKind, periodic: bool) {
        self.ticks.push(Tick {
            at_ms: at_ms.max(self.now_ms),
            kind,
            periodic,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: TickKind, periodic: bool) {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), kind, periodic);
    }

    pub fn next_tick_at(&self) -> Option<u64> {
        self.ticks.peek().map(|t| t.at_ms)
    }

    /// Pops the earliest tick if it is due. The clock never moves backwards,
    /// so ticks scheduled in the past run at the current time.
    pub fn pop_due(&mut self) -> Option<Tick> {
        if self.ticks.peek()?.at_ms > self.now_ms {
            return None;
        }
        self.ticks.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_pop_in_time_order() {
        let mut clock = DispatchClock::default();
        clock.schedule_at(10, TickKind::TryMatch, false);
        clock.schedule_at(5, TickKind::HeartbeatSweep, true);
        clock.schedule_at(20, TickKind::TryMatch, true);

        clock.advance_to(50);
        let first = clock.pop_due().expect("first tick");
        assert_eq!(first.at_ms, 5);
        assert_eq!(first.kind, TickKind::HeartbeatSweep);

        let second = clock.pop_due().expect("second tick");
        assert_eq!(second.at_ms, 10);

        let third = clock.pop_due().expect("third tick");
        assert_eq!(third.at_ms, 20);

        assert!(clock.pop_due().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn future_ticks_are_not_due() {
        let mut clock = DispatchClock::default();
        clock.schedule_in(100, TickKind::HeartbeatSweep, true);

        assert!(clock.pop_due().is_none());
        clock.advance_to(99);
        assert!(clock.pop_due().is_none());
        clock.advance_to(100);
        assert!(clock.pop_due().is_some());
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock = DispatchClock::default();
        clock.advance_to(500);
        clock.advance_to(200);
        assert_eq!(clock.now_ms(), 500);
    }

    #[test]
    fn stale_schedule_is_clamped_to_now() {
        let mut clock = DispatchClock::default();
        clock.advance_to(1000);
        clock.schedule_at(10, TickKind::TryMatch, false);

        let tick = clock.pop_due().expect("clamped tick");
        assert_eq!(tick.at_ms, 1000);
    }
}
