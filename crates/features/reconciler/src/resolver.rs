//! Maps a task's selector onto a snapshot. Pure: no I/O, no clock reads.

use crate::source::Snapshot;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use zb_domain::{AvailabilityEntry, LocationSelector, OfferingSelector, RegistrationTask, TimeWindow};
use zb_kernel::clock::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Resolved(&'a AvailabilityEntry),
    /// The window has passed, or a directly named entry is no longer offered.
    Expired,
    /// The window lies ahead but is not bookable yet.
    NotYetAvailable,
    /// The selector cannot match anything in this snapshot.
    NotFound,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    zone: Zone,
}

impl Resolver {
    #[must_use]
    pub const fn new(zone: Zone) -> Self {
        Self { zone }
    }

    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    #[must_use]
    pub fn resolve<'a>(
        &self,
        task: &RegistrationTask,
        snapshot: &'a Snapshot,
        now: DateTime<Utc>,
    ) -> Resolution<'a> {
        if task.kind() != snapshot.kind {
            return Resolution::NotFound;
        }

        match task {
            RegistrationTask::Location { selector: LocationSelector::DirectId(id), .. }
            | RegistrationTask::Class { selector: OfferingSelector::DirectId(id), .. }
            | RegistrationTask::Ticket { selector: OfferingSelector::DirectId(id), .. } => {
                by_id(id, &snapshot.entries)
            },
            RegistrationTask::Location { selector: LocationSelector::TimeWindow(window), .. } => {
                self.by_window(window, &snapshot.entries, now)
            },
        }
    }

    fn by_window<'a>(
        &self,
        window: &TimeWindow,
        entries: &'a [AvailabilityEntry],
        now: DateTime<Utc>,
    ) -> Resolution<'a> {
        let wanted = window.date.and_time(window.time);
        let Some(target) = self.zone.localize(wanted) else {
            return Resolution::NotFound;
        };
        if target < now {
            return Resolution::Expired;
        }

        entries
            .iter()
            .find(|entry| {
                same_tag(entry.tag(), &window.facility)
                    && self.zone.to_local(entry.start()).is_some_and(|start| same_minute(start, wanted))
            })
            .map_or(Resolution::NotYetAvailable, Resolution::Resolved)
    }
}

fn by_id<'a>(id: &str, entries: &'a [AvailabilityEntry]) -> Resolution<'a> {
    entries
        .iter()
        .find(|entry| same_id(entry.id(), id))
        .map_or(Resolution::Expired, Resolution::Resolved)
}

/// Ids compare as numbers when both sides are numeric (`"042"` is `"42"`).
fn same_id(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

fn same_tag(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn same_minute(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date() && a.hour() == b.hour() && a.minute() == b.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use zb_domain::{ClassOffering, LocationSlot, TaskKind};

    fn utc() -> Zone {
        "utc".parse().unwrap()
    }

    fn slot(id: &str, name: &str, start: i64) -> AvailabilityEntry {
        AvailabilityEntry::Location(LocationSlot {
            id: id.into(),
            name: name.into(),
            registration_id: "1".into(),
            pool_id: "2".into(),
            offering_id: "3".into(),
            start,
            end: start + 3600,
            enrolled: 0,
            max_enrolled: 10,
        })
    }

    fn window_task(date: (i32, u32, u32), hh: u32, mm: u32, facility: &str) -> RegistrationTask {
        RegistrationTask::location_window(
            "C1",
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
            facility,
        )
    }

    // 2025-06-01 08:00:00 UTC
    const EIGHT_AM: i64 = 1_748_764_800;

    #[test]
    fn direct_id_found_and_missing() {
        let snapshot = Snapshot::new(TaskKind::Location, vec![slot("P42", "Zwemmen", EIGHT_AM)]);
        let resolver = Resolver::new(utc());
        let now = Utc.timestamp_opt(0, 0).unwrap();

        let found = resolver.resolve(&RegistrationTask::location_slot("C1", "P42"), &snapshot, now);
        assert_eq!(found, Resolution::Resolved(&snapshot.entries[0]));

        let gone = resolver.resolve(&RegistrationTask::location_slot("C1", "P43"), &snapshot, now);
        assert_eq!(gone, Resolution::Expired);
    }

    #[test]
    fn numeric_ids_ignore_leading_zeros() {
        assert!(same_id("042", "42"));
        assert!(same_id(" 7 ", "7"));
        assert!(!same_id("P42", "42"));
    }

    #[test]
    fn window_matches_tag_case_insensitively_and_drops_seconds() {
        let snapshot =
            Snapshot::new(TaskKind::Location, vec![slot("P1", " zwemmen ", EIGHT_AM + 30)]);
        let resolver = Resolver::new(utc());
        let now = Utc.timestamp_opt(EIGHT_AM - 86_400, 0).unwrap();

        let task = window_task((2025, 6, 1), 8, 0, "Zwemmen");
        assert_eq!(resolver.resolve(&task, &snapshot, now), Resolution::Resolved(&snapshot.entries[0]));
    }

    #[test]
    fn window_in_the_past_is_expired_even_if_listed() {
        let snapshot = Snapshot::new(TaskKind::Location, vec![slot("P1", "Zwemmen", EIGHT_AM)]);
        let resolver = Resolver::new(utc());
        let now = Utc.timestamp_opt(EIGHT_AM + 1, 0).unwrap();

        let task = window_task((2025, 6, 1), 8, 0, "Zwemmen");
        assert_eq!(resolver.resolve(&task, &snapshot, now), Resolution::Expired);
    }

    #[test]
    fn future_window_without_entry_is_not_yet_available() {
        let snapshot = Snapshot::new(TaskKind::Location, vec![slot("P1", "Fitness", EIGHT_AM)]);
        let resolver = Resolver::new(utc());
        let now = Utc.timestamp_opt(EIGHT_AM - 60, 0).unwrap();

        let task = window_task((2025, 6, 1), 8, 0, "Zwemmen");
        assert_eq!(resolver.resolve(&task, &snapshot, now), Resolution::NotYetAvailable);
    }

    #[test]
    fn window_respects_configured_offset() {
        // 10:00 at +02:00 is 08:00 UTC.
        let snapshot = Snapshot::new(TaskKind::Location, vec![slot("P1", "Zwemmen", EIGHT_AM)]);
        let resolver = Resolver::new("+02:00".parse().unwrap());
        let now = Utc.timestamp_opt(0, 0).unwrap();

        let hit = window_task((2025, 6, 1), 10, 0, "Zwemmen");
        assert_eq!(resolver.resolve(&hit, &snapshot, now), Resolution::Resolved(&snapshot.entries[0]));
        let miss = window_task((2025, 6, 1), 8, 0, "Zwemmen");
        assert_eq!(resolver.resolve(&miss, &snapshot, now), Resolution::NotYetAvailable);
    }

    #[test]
    fn kind_mismatch_is_not_found() {
        let offering = AvailabilityEntry::Class(ClassOffering {
            id: "P42".into(),
            name: "Yoga".into(),
            start: EIGHT_AM,
            end: EIGHT_AM + 3600,
            enrolled: 0,
            max_enrolled: 10,
        });
        let snapshot = Snapshot::new(TaskKind::Class, vec![offering]);
        let resolver = Resolver::new(utc());
        let now = Utc.timestamp_opt(0, 0).unwrap();

        let task = RegistrationTask::location_slot("C1", "P42");
        assert_eq!(resolver.resolve(&task, &snapshot, now), Resolution::NotFound);
    }
}
