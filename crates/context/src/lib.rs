//! Real-time context snapshots for prompt composition.
//!
//! A snapshot combines clock/calendar facts (pure functions of local time)
//! with a best-effort IP geolocation lookup. Snapshots must never fail the
//! caller: on lookup failure or timeout the location degrades to the
//! "Unknown" sentinel.
//!
//! Bucket thresholds are fixed: morning 05:00–12:00, afternoon 12:00–17:00,
//! evening 17:00–21:00, night otherwise. Weekend is Saturday/Sunday.

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const GEO_LOOKUP_URL: &str = "https://ipapi.co/json/";
const GEO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Clock- and calendar-derived facts about the current moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeInfo {
    /// e.g. "Monday, August 24, 2026"
    pub current_date: String,
    /// e.g. "03:15 PM"
    pub current_time: String,
    pub timezone: String,
    pub day_of_week: String,
    pub month: String,
    pub year: String,
    pub hour: u32,
    pub is_weekend: bool,
    pub is_weekday: bool,
    pub is_morning: bool,
    pub is_afternoon: bool,
    pub is_evening: bool,
    pub is_night: bool,
    pub is_holiday_season: bool,
    pub season: String,
    pub is_school_year: bool,
}

/// Reverse-geolocation facts, or the Unknown sentinel when detection failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub region: String,
    pub country: String,
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Whether the lookup actually succeeded
    pub detected: bool,
}

impl LocationInfo {
    /// The sentinel returned whenever detection fails.
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".into(),
            region: "Unknown".into(),
            country: "Unknown".into(),
            timezone: "Unknown".into(),
            latitude: None,
            longitude: None,
            detected: false,
        }
    }
}

/// A full context snapshot: time facts plus location facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub time: TimeInfo,
    pub location: LocationInfo,
}

impl ContextSnapshot {
    /// Flatten the snapshot into a JSON map for the conversation context.
    pub fn to_context_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            "time".into(),
            serde_json::to_value(&self.time).unwrap_or_default(),
        );
        map.insert(
            "location".into(),
            serde_json::to_value(&self.location).unwrap_or_default(),
        );
        map.insert(
            "last_updated".into(),
            serde_json::Value::String(Local::now().to_rfc3339()),
        );
        map
    }
}

/// Compute the time portion of a snapshot from a wall-clock instant.
///
/// Pure function; `snapshot()` feeds it `Local::now()`.
pub fn time_info_at<Tz: chrono::TimeZone>(now: DateTime<Tz>) -> TimeInfo
where
    Tz::Offset: std::fmt::Display,
{
    let hour = now.hour();
    // chrono: Monday = 0 ... Sunday = 6
    let weekday_index = now.weekday().num_days_from_monday();
    let is_weekend = weekday_index >= 5;

    TimeInfo {
        current_date: now.format("%A, %B %d, %Y").to_string(),
        current_time: now.format("%I:%M %p").to_string(),
        timezone: "Local Time".into(),
        day_of_week: now.format("%A").to_string(),
        month: now.format("%B").to_string(),
        year: now.format("%Y").to_string(),
        hour,
        is_weekend,
        is_weekday: !is_weekend,
        is_morning: (5..12).contains(&hour),
        is_afternoon: (12..17).contains(&hour),
        is_evening: (17..21).contains(&hour),
        is_night: hour >= 21 || hour < 5,
        is_holiday_season: is_holiday_season(now.month(), now.day()),
        season: season_of(now.month()).into(),
        is_school_year: is_school_year(now.month()),
    }
}

/// Thanksgiving week (approximated as Nov 22) through New Year's week.
fn is_holiday_season(month: u32, day: u32) -> bool {
    match month {
        11 => day >= 22,
        12 => true,
        1 => day <= 7,
        _ => false,
    }
}

fn season_of(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Spring",
        6..=8 => "Summer",
        _ => "Fall",
    }
}

/// September through June.
fn is_school_year(month: u32) -> bool {
    !(7..=8).contains(&month)
}

/// Produces context snapshots, caching nothing between calls.
pub struct ContextProvider {
    client: reqwest::Client,
    geo_url: String,
}

impl ContextProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(GEO_LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            geo_url: GEO_LOOKUP_URL.into(),
        }
    }

    /// Point the geolocation lookup at a different endpoint (for tests).
    pub fn with_geo_url(mut self, url: impl Into<String>) -> Self {
        self.geo_url = url.into();
        self
    }

    /// Take a full snapshot. Never fails: location degrades to Unknown.
    pub async fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            time: time_info_at(Local::now()),
            location: self.lookup_location().await,
        }
    }

    /// Best-effort IP geolocation with a bounded timeout.
    async fn lookup_location(&self) -> LocationInfo {
        match self.fetch_location().await {
            Ok(info) => {
                debug!(city = %info.city, country = %info.country, "Location detected");
                info
            }
            Err(e) => {
                warn!("Location detection failed: {e}");
                LocationInfo::unknown()
            }
        }
    }

    async fn fetch_location(&self) -> Result<LocationInfo, reqwest::Error> {
        #[derive(Deserialize)]
        struct GeoResponse {
            city: Option<String>,
            region: Option<String>,
            country_name: Option<String>,
            timezone: Option<String>,
            latitude: Option<f64>,
            longitude: Option<f64>,
        }

        let resp = self
            .client
            .get(&self.geo_url)
            .send()
            .await?
            .error_for_status()?;
        let data: GeoResponse = resp.json().await?;

        let or_unknown = |s: Option<String>| s.unwrap_or_else(|| "Unknown".into());
        Ok(LocationInfo {
            city: or_unknown(data.city),
            region: or_unknown(data.region),
            country: or_unknown(data.country_name),
            timezone: or_unknown(data.timezone),
            latitude: data.latitude,
            longitude: data.longitude,
            detected: true,
        })
    }
}

impl Default for ContextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> TimeInfo {
        time_info_at(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    #[test]
    fn buckets_partition_the_day() {
        for hour in 0..24 {
            let info = at(2026, 3, 4, hour, 0);
            let flags = [
                info.is_morning,
                info.is_afternoon,
                info.is_evening,
                info.is_night,
            ];
            assert_eq!(
                flags.iter().filter(|f| **f).count(),
                1,
                "hour {hour} must fall into exactly one bucket"
            );
        }
    }

    #[test]
    fn bucket_boundaries() {
        assert!(at(2026, 3, 4, 4, 59).is_night);
        assert!(at(2026, 3, 4, 5, 0).is_morning);
        assert!(at(2026, 3, 4, 11, 59).is_morning);
        assert!(at(2026, 3, 4, 12, 0).is_afternoon);
        assert!(at(2026, 3, 4, 16, 59).is_afternoon);
        assert!(at(2026, 3, 4, 17, 0).is_evening);
        assert!(at(2026, 3, 4, 20, 59).is_evening);
        assert!(at(2026, 3, 4, 21, 0).is_night);
    }

    #[test]
    fn weekend_is_saturday_or_sunday() {
        // 2026-08-22 is a Saturday, 2026-08-23 a Sunday, 2026-08-24 a Monday
        let sat = at(2026, 8, 22, 10, 0);
        let sun = at(2026, 8, 23, 10, 0);
        let mon = at(2026, 8, 24, 10, 0);
        assert!(sat.is_weekend && !sat.is_weekday);
        assert!(sun.is_weekend && !sun.is_weekday);
        assert!(!mon.is_weekend && mon.is_weekday);
    }

    #[test]
    fn weekday_is_exact_complement() {
        for day in 1..=7 {
            let info = at(2026, 6, day, 12, 0);
            assert_ne!(info.is_weekend, info.is_weekday);
        }
    }

    #[test]
    fn seasons() {
        assert_eq!(at(2026, 1, 15, 0, 0).season, "Winter");
        assert_eq!(at(2026, 4, 15, 0, 0).season, "Spring");
        assert_eq!(at(2026, 7, 15, 0, 0).season, "Summer");
        assert_eq!(at(2026, 10, 15, 0, 0).season, "Fall");
        assert_eq!(at(2026, 12, 15, 0, 0).season, "Winter");
    }

    #[test]
    fn holiday_season_window() {
        assert!(!at(2026, 11, 21, 0, 0).is_holiday_season);
        assert!(at(2026, 11, 22, 0, 0).is_holiday_season);
        assert!(at(2026, 12, 25, 0, 0).is_holiday_season);
        assert!(at(2026, 1, 7, 0, 0).is_holiday_season);
        assert!(!at(2026, 1, 8, 0, 0).is_holiday_season);
    }

    #[test]
    fn school_year_excludes_summer_break() {
        assert!(at(2026, 9, 1, 0, 0).is_school_year);
        assert!(at(2026, 6, 1, 0, 0).is_school_year);
        assert!(!at(2026, 7, 1, 0, 0).is_school_year);
        assert!(!at(2026, 8, 1, 0, 0).is_school_year);
    }

    #[test]
    fn unknown_sentinel_shape() {
        let loc = LocationInfo::unknown();
        assert_eq!(loc.city, "Unknown");
        assert!(!loc.detected);
        assert!(loc.latitude.is_none());
    }

    #[tokio::test]
    async fn snapshot_degrades_to_unknown_on_unreachable_endpoint() {
        // Closed port: lookup fails fast, snapshot must still succeed.
        let provider = ContextProvider::new().with_geo_url("http://127.0.0.1:9/json/");
        let snap = provider.snapshot().await;
        assert!(!snap.location.detected);
        assert_eq!(snap.location.city, "Unknown");
    }

    #[test]
    fn context_map_has_expected_keys() {
        let snap = ContextSnapshot {
            time: at(2026, 8, 24, 10, 0),
            location: LocationInfo::unknown(),
        };
        let map = snap.to_context_map();
        assert!(map.contains_key("time"));
        assert!(map.contains_key("location"));
        assert!(map.contains_key("last_updated"));
    }
}
