//! Time sources and the facility time zone.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc,
};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" for everything that compares against wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Second resolution.
#[derive(Debug)]
pub struct ManualClock {
    epoch: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { epoch: AtomicI64::new(at.timestamp()) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.epoch.store(at.timestamp(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.epoch.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch.load(Ordering::SeqCst), 0).unwrap_or_default()
    }
}

#[zb_derive::zb_error]
pub enum ClockError {
    #[error("Unknown time zone '{value}'{}: use 'local', 'utc' or an offset like '+01:00'", format_context(.context))]
    InvalidZone { value: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn invalid_zone(value: &str) -> ClockError {
    ClockError::InvalidZone { value: value.to_owned().into(), context: None }
}

/// Zone in which queued dates and times are meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's zone, including its daylight saving rules.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl FromStr for Zone {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::Fixed(FixedOffset::east_opt(0).ok_or_else(|| invalid_zone(s))?));
        }
        trimmed.parse::<FixedOffset>().map(Self::Fixed).map_err(|_| invalid_zone(s))
    }
}

impl Zone {
    /// The instant a local wall-clock time denotes.
    ///
    /// `None` for times skipped by a daylight saving jump. For times that occur
    /// twice the earlier instant wins.
    #[must_use]
    pub fn localize(self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Local => pick(Local.from_local_datetime(&local)),
            Self::Fixed(offset) => pick(offset.from_local_datetime(&local)),
        }
    }

    /// Wall-clock reading of an epoch second in this zone.
    #[must_use]
    pub fn to_local(self, epoch: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::from_timestamp(epoch, 0)?;
        Some(match self {
            Self::Local => utc.with_timezone(&Local).naive_local(),
            Self::Fixed(offset) => utc.with_timezone(&offset).naive_local(),
        })
    }
}

fn pick<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    match result {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn parses_supported_spellings() {
        assert_eq!("local".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!(" LOCAL ".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("utc".parse::<Zone>().unwrap(), Zone::Fixed(FixedOffset::east_opt(0).unwrap()));
        assert_eq!(
            "+01:00".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(3600).unwrap())
        );
        assert_eq!(
            "-0530".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap())
        );
        assert!("".parse::<Zone>().is_err());
    }

    #[test]
    fn unknown_zone_names_the_rejected_value() {
        let err = "Europe/Amsterdam".parse::<Zone>().unwrap_err();
        assert!(matches!(&err, ClockError::InvalidZone { value, .. } if value == "Europe/Amsterdam"));
        assert!(err.to_string().contains("'Europe/Amsterdam'"));

        let err: Result<Zone, _> = "Mars".parse::<Zone>().context("clock.timezone");
        assert!(err.unwrap_err().to_string().contains("(clock.timezone)"));
    }

    #[test]
    fn fixed_offset_localizes() {
        let zone: Zone = "+02:00".parse().unwrap();
        let instant = zone.localize(at(2025, 6, 1, 8, 0)).unwrap();
        assert_eq!(instant.timestamp(), 1_748_757_600);
        assert_eq!(zone.to_local(1_748_757_600), Some(at(2025, 6, 1, 8, 0)));
    }

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::new(DateTime::from_timestamp(1_000, 0).unwrap());
        assert_eq!(clock.now().timestamp(), 1_000);
        clock.advance(TimeDelta::minutes(10));
        assert_eq!(clock.now().timestamp(), 1_600);
        clock.set(DateTime::from_timestamp(5, 0).unwrap());
        assert_eq!(clock.now().timestamp(), 5);
    }

    proptest! {
        #[test]
        fn fixed_zone_round_trips_wall_clock(
            offset_min in -720i32..=840,
            epoch in 0i64..4_000_000_000,
        ) {
            let zone = Zone::Fixed(FixedOffset::east_opt(offset_min * 60).unwrap());
            let local = zone.to_local(epoch).unwrap();
            prop_assert_eq!(zone.localize(local).unwrap().timestamp(), epoch);
        }
    }
}
