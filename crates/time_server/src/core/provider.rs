use std::str::FromStr;
use std::sync::Arc;

use chrono::{SecondsFormat, Timelike};
use chrono_tz::Tz;

use crate::core::{
    clock::{Clock, SystemClock},
    error::{TimeServerError, TimeServerResult},
    models::TimeFormat,
    utils::{self, ISO_WALL_CLOCK_FORMAT, LOCALE_FORMAT},
};

/// Time server implementation
#[derive(Clone)]
pub struct TimeServer {
    pub(crate) local_timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl TimeServer {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        // Try to detect the system's local timezone
        let local_tz = match iana_time_zone::get_timezone() {
            Ok(tz_name) => match tz_name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    tracing::warn!("Could not parse timezone '{}', defaulting to UTC", tz_name);
                    chrono_tz::UTC
                }
            },
            Err(_) => {
                tracing::warn!("Could not detect system timezone, defaulting to UTC");
                chrono_tz::UTC
            }
        };

        Self {
            local_timezone: local_tz,
            clock,
        }
    }

    pub(crate) fn parse_timezone(&self, timezone_name: &str) -> TimeServerResult<Tz> {
        Tz::from_str(timezone_name).map_err(|_| TimeServerError::InvalidTimezone {
            timezone: timezone_name.to_string(),
        })
    }

    /// Render the current time in the requested format.
    ///
    /// Without a timezone the `iso` rendering is RFC 3339 UTC. With one it is
    /// the wall-clock time in that zone suffixed with a literal `Z` even
    /// though the value is not UTC; downstream consumers depend on this
    /// labeling, so it is kept as-is.
    pub fn get_current_time(
        &self,
        timezone: Option<&str>,
        format: TimeFormat,
    ) -> TimeServerResult<String> {
        let now = self.clock.now_utc();

        match format {
            TimeFormat::Unix => Ok(now.timestamp().to_string()),
            TimeFormat::Locale => {
                let zoned = match timezone {
                    Some(name) => now.with_timezone(&self.parse_timezone(name)?),
                    None => now.with_timezone(&self.local_timezone),
                };
                Ok(zoned.format(LOCALE_FORMAT).to_string())
            }
            TimeFormat::Iso => match timezone {
                Some(name) => {
                    let zoned = now.with_timezone(&self.parse_timezone(name)?);
                    Ok(format!("{}Z", zoned.format(ISO_WALL_CLOCK_FORMAT)))
                }
                None => Ok(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            },
        }
    }

    /// Approximate a timezone's UTC offset in whole hours.
    ///
    /// Compares the hour component of the current wall-clock time in the
    /// target zone against the current UTC hour and folds the delta into
    /// [-12, 12]. Zones with sub-hour offsets collapse to a whole hour, and
    /// zones beyond ±12 wrap; both are known limits of this approximation.
    pub fn get_timezone_offset(&self, timezone_name: &str) -> TimeServerResult<i32> {
        let timezone = self.parse_timezone(timezone_name)?;
        let now = self.clock.now_utc();

        let zone_hour = now.with_timezone(&timezone).hour() as i32;
        let utc_hour = now.hour() as i32;

        Ok(utils::normalize_hour_offset(zone_hour - utc_hour))
    }
}

impl Default for TimeServer {
    fn default() -> Self {
        Self::new()
    }
}
