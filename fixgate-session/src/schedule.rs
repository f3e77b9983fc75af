/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session schedule.
//!
//! A schedule is either always on, a daily window, or a weekly window.
//! Windows whose end precedes their start wrap around midnight (daily) or
//! the end of the week (weekly).

use crate::settings::{Settings, keys};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use fixgate_core::error::ConfigError;

const SECONDS_PER_DAY: u32 = 86_400;

/// When a session is allowed to be logged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleWindow {
    /// No time restriction.
    NonStop,
    /// The same window every day.
    Daily {
        /// Start of the window.
        start: NaiveTime,
        /// End of the window (inclusive).
        end: NaiveTime,
    },
    /// One window per week.
    Weekly {
        /// Start day.
        start_day: Weekday,
        /// Start time on the start day.
        start: NaiveTime,
        /// End day.
        end_day: Weekday,
        /// End time on the end day (inclusive).
        end: NaiveTime,
    },
}

/// Session time schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSchedule {
    window: ScheduleWindow,
    use_local_time: bool,
}

impl SessionSchedule {
    /// A schedule with no time restriction.
    #[must_use]
    pub const fn non_stop() -> Self {
        Self {
            window: ScheduleWindow::NonStop,
            use_local_time: false,
        }
    }

    /// A daily window evaluated in UTC.
    #[must_use]
    pub const fn daily(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            window: ScheduleWindow::Daily { start, end },
            use_local_time: false,
        }
    }

    /// A weekly window evaluated in UTC.
    #[must_use]
    pub const fn weekly(
        start_day: Weekday,
        start: NaiveTime,
        end_day: Weekday,
        end: NaiveTime,
    ) -> Self {
        Self {
            window: ScheduleWindow::Weekly {
                start_day,
                start,
                end_day,
                end,
            },
            use_local_time: false,
        }
    }

    /// Evaluates the window in local time instead of UTC.
    #[must_use]
    pub const fn with_local_time(mut self, use_local_time: bool) -> Self {
        self.use_local_time = use_local_time;
        self
    }

    /// Reads the schedule from `StartTime`, `EndTime`, `StartDay`, `EndDay`
    /// and `UseLocalTime`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] when only one of a start/end
    /// pair is set or days are given without times, and
    /// [`ConfigError::InvalidSetting`] for malformed values.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let use_local_time = settings.get_bool_or(keys::USE_LOCAL_TIME, false)?;
        let times = pair(
            settings.get_time(keys::START_TIME)?,
            settings.get_time(keys::END_TIME)?,
            keys::START_TIME,
            keys::END_TIME,
        )?;
        let days = pair(
            settings.get_day(keys::START_DAY)?,
            settings.get_day(keys::END_DAY)?,
            keys::START_DAY,
            keys::END_DAY,
        )?;

        let schedule = match (times, days) {
            (None, None) => Self::non_stop(),
            (None, Some(_)) => return Err(ConfigError::missing(keys::START_TIME)),
            (Some((start, end)), None) => Self::daily(start, end),
            (Some((start, end)), Some((start_day, end_day))) => {
                Self::weekly(start_day, start, end_day, end)
            }
        };
        Ok(schedule.with_local_time(use_local_time))
    }

    /// Returns the configured window.
    #[must_use]
    pub const fn window(&self) -> ScheduleWindow {
        self.window
    }

    /// Returns true if the window is evaluated in local time.
    #[must_use]
    pub const fn uses_local_time(&self) -> bool {
        self.use_local_time
    }

    /// Returns true if `now` falls inside the session window.
    #[must_use]
    pub fn is_session_time(&self, now: DateTime<Utc>) -> bool {
        let now: NaiveDateTime = if self.use_local_time {
            now.with_timezone(&Local).naive_local()
        } else {
            now.naive_utc()
        };

        match self.window {
            ScheduleWindow::NonStop => true,
            ScheduleWindow::Daily { start, end } => {
                within(seconds(start), seconds(end), seconds(now.time()))
            }
            ScheduleWindow::Weekly {
                start_day,
                start,
                end_day,
                end,
            } => within(
                week_seconds(start_day, start),
                week_seconds(end_day, end),
                week_seconds(now.weekday(), now.time()),
            ),
        }
    }
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self::non_stop()
    }
}

fn pair<T>(
    start: Option<T>,
    end: Option<T>,
    start_key: &str,
    end_key: &str,
) -> Result<Option<(T, T)>, ConfigError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some((start, end))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::missing(end_key)),
        (None, Some(_)) => Err(ConfigError::missing(start_key)),
    }
}

fn seconds(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}

fn week_seconds(day: Weekday, time: NaiveTime) -> u32 {
    day.num_days_from_monday() * SECONDS_PER_DAY + seconds(time)
}

// Equal bounds mean the window never closes.
fn within(start: u32, end: u32, now: u32) -> bool {
    match start.cmp(&end) {
        std::cmp::Ordering::Equal => true,
        std::cmp::Ordering::Less => start <= now && now <= end,
        std::cmp::Ordering::Greater => now >= start || now <= end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    // 2026-01-05 is a Monday.
    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, h, m, 0).unwrap()
    }

    #[test]
    fn test_non_stop() {
        let schedule = SessionSchedule::default();
        assert_eq!(schedule.window(), ScheduleWindow::NonStop);
        assert!(schedule.is_session_time(at(5, 3, 0)));
    }

    #[test]
    fn test_daily_window() {
        let schedule = SessionSchedule::daily(time(8, 0, 0), time(17, 0, 0));
        assert!(schedule.is_session_time(at(5, 8, 0)));
        assert!(schedule.is_session_time(at(6, 12, 30)));
        assert!(schedule.is_session_time(at(7, 17, 0)));
        assert!(!schedule.is_session_time(at(5, 17, 1)));
        assert!(!schedule.is_session_time(at(5, 7, 59)));
    }

    #[test]
    fn test_daily_window_wraps_midnight() {
        let schedule = SessionSchedule::daily(time(22, 0, 0), time(6, 0, 0));
        assert!(schedule.is_session_time(at(5, 23, 0)));
        assert!(schedule.is_session_time(at(6, 2, 0)));
        assert!(!schedule.is_session_time(at(6, 12, 0)));
    }

    #[test]
    fn test_weekly_window() {
        let schedule =
            SessionSchedule::weekly(Weekday::Mon, time(9, 0, 0), Weekday::Fri, time(17, 0, 0));
        assert!(schedule.is_session_time(at(7, 3, 0)));
        assert!(schedule.is_session_time(at(9, 17, 0)));
        assert!(!schedule.is_session_time(at(10, 12, 0)));
        assert!(!schedule.is_session_time(at(5, 8, 59)));
    }

    #[test]
    fn test_weekly_window_wraps_week_end() {
        let schedule =
            SessionSchedule::weekly(Weekday::Sun, time(18, 0, 0), Weekday::Fri, time(17, 0, 0));
        assert!(schedule.is_session_time(at(11, 19, 0)));
        assert!(schedule.is_session_time(at(5, 0, 0)));
        assert!(!schedule.is_session_time(at(10, 12, 0)));
        assert!(!schedule.is_session_time(at(11, 17, 0)));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::new()
            .with("StartTime", "08:00:00")
            .with("EndTime", "17:00:00")
            .with("StartDay", "mon")
            .with("EndDay", "friday")
            .with("UseLocalTime", "Y");
        let schedule = SessionSchedule::from_settings(&settings).unwrap();
        assert!(schedule.uses_local_time());
        assert_eq!(
            schedule.window(),
            ScheduleWindow::Weekly {
                start_day: Weekday::Mon,
                start: time(8, 0, 0),
                end_day: Weekday::Fri,
                end: time(17, 0, 0),
            }
        );
    }

    #[test]
    fn test_from_settings_requires_pairs() {
        let settings = Settings::new().with("StartTime", "08:00:00");
        let err = SessionSchedule::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { ref key } if key == "EndTime"));

        let settings = Settings::new().with("StartDay", "Mon").with("EndDay", "Fri");
        let err = SessionSchedule::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { ref key } if key == "StartTime"));
    }

    #[test]
    fn test_from_settings_rejects_malformed_time() {
        let settings = Settings::new()
            .with("StartTime", "8am")
            .with("EndTime", "17:00:00");
        let err = SessionSchedule::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref key, .. } if key == "StartTime"));
    }
}
