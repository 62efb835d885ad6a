//! Event schedule domain types
//!
//! Persisted cron specifications that periodically emit trigger events. The
//! synchronizer fingerprints the enabled set with a digest so unchanged data
//! never causes an entry rebuild.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Normalized representation of a cron field: spaces stripped, empty means "*".
pub fn cronexp(field: &str) -> String {
    let stripped = field.replace(' ', "");
    if stripped.is_empty() {
        "*".to_string()
    } else {
        stripped
    }
}

fn default_field() -> String {
    "*".to_string()
}

/// Five-field cron specification (minute, hour, day of month, month, day of week).
///
/// Each field is a cron expression string: `*`, numbers, comma lists, ranges
/// and `/step` suffixes. Day of week counts Sunday as 0 or 7, Monday as 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSpec {
    #[serde(default = "default_field")]
    pub minute: String,
    #[serde(default = "default_field")]
    pub hour: String,
    #[serde(default = "default_field")]
    pub day_of_month: String,
    #[serde(default = "default_field")]
    pub month_of_year: String,
    #[serde(default = "default_field")]
    pub day_of_week: String,
}

impl Default for CronSpec {
    fn default() -> Self {
        Self {
            minute: default_field(),
            hour: default_field(),
            day_of_month: default_field(),
            month_of_year: default_field(),
            day_of_week: default_field(),
        }
    }
}

impl std::fmt::Display for CronSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            cronexp(&self.minute),
            cronexp(&self.hour),
            cronexp(&self.day_of_month),
            cronexp(&self.month_of_year),
            cronexp(&self.day_of_week)
        )
    }
}

impl CronSpec {
    /// Copy with every field passed through [`cronexp`].
    pub fn normalized(&self) -> CronSpec {
        CronSpec {
            minute: cronexp(&self.minute),
            hour: cronexp(&self.hour),
            day_of_month: cronexp(&self.day_of_month),
            month_of_year: cronexp(&self.month_of_year),
            day_of_week: cronexp(&self.day_of_week),
        }
    }

    /// Check every field for parseable cron syntax.
    pub fn validate(&self) -> Result<(), String> {
        for (name, field) in [
            ("minute", &self.minute),
            ("hour", &self.hour),
            ("day_of_month", &self.day_of_month),
            ("month_of_year", &self.month_of_year),
            ("day_of_week", &self.day_of_week),
        ] {
            if !is_valid_field(&cronexp(field)) {
                return Err(format!("invalid cron expression for {}: '{}'", name, field));
            }
        }
        Ok(())
    }

    /// Whether the spec fires at the given instant (minute resolution).
    ///
    /// Day-of-month and day-of-week are both required to match when both are
    /// restricted.
    pub fn matches(&self, at: &chrono::DateTime<chrono::Utc>) -> bool {
        use chrono::{Datelike, Timelike};

        let dow = at.weekday().num_days_from_sunday();

        field_matches(&cronexp(&self.minute), at.minute())
            && field_matches(&cronexp(&self.hour), at.hour())
            && field_matches(&cronexp(&self.day_of_month), at.day())
            && field_matches(&cronexp(&self.month_of_year), at.month())
            && (field_matches(&cronexp(&self.day_of_week), dow)
                || (dow == 0 && field_matches(&cronexp(&self.day_of_week), 7)))
    }
}

/// Whether a single cron field expression covers a value.
///
/// Invalid tokens never match; validation happens separately at schedule
/// creation time.
pub fn field_matches(expr: &str, value: u32) -> bool {
    expr.split(',')
        .any(|token| token_matches(token, value) == Some(true))
}

/// Whether a cron field expression parses cleanly.
pub fn is_valid_field(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .split(',')
            .all(|token| token_matches(token, 0).is_some())
}

/// Match one comma-separated token against a value. `None` means the token is
/// syntactically invalid.
fn token_matches(token: &str, value: u32) -> Option<bool> {
    let (base, step) = match token.split_once('/') {
        Some((base, step)) => (base, Some(step.parse::<u32>().ok().filter(|s| *s > 0)?)),
        None => (token, None),
    };

    let (low, high) = if base == "*" {
        (0, u32::MAX)
    } else if let Some((low, high)) = base.split_once('-') {
        let low = low.parse::<u32>().ok()?;
        let high = high.parse::<u32>().ok()?;
        if low > high {
            return None;
        }
        (low, high)
    } else {
        let exact = base.parse::<u32>().ok()?;
        // A bare number with a step acts as the start of an open range.
        if step.is_some() {
            (exact, u32::MAX)
        } else {
            (exact, exact)
        }
    };

    if value < low || value > high {
        return Some(false);
    }

    match step {
        Some(step) => Some((value - low) % step == 0),
        None => Some(true),
    }
}

/// Persisted cron specification plus the event payload it emits.
///
/// Only enabled rows are read by the synchronizer. The payload must resolve
/// to an event object (at least a `name` field) when the schedule fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSchedule {
    pub id: Uuid,
    pub event: serde_json::Value,
    pub principal: String,
    pub enabled: bool,
    #[serde(flatten)]
    pub cron: CronSpec,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EventSchedule {
    /// Stable scheduler-entry key for this schedule, so reconciliation runs
    /// recognize re-adds as updates rather than churn.
    pub fn entry_key(&self) -> String {
        format!("schedule-{}", self.id)
    }
}

/// Deterministic fingerprint over a set of enabled schedules.
///
/// A function of row identity and cron-field representation only; callers
/// must pass rows in a stable order.
pub fn compute_schedule_digest(schedules: &[EventSchedule]) -> String {
    let mut hasher = Sha256::new();
    for schedule in schedules {
        hasher.update(format!("{}-{}", schedule.id, schedule.cron));
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schedule(minute: &str, enabled: bool) -> EventSchedule {
        EventSchedule {
            id: Uuid::new_v4(),
            event: serde_json::json!({"name": "nightly"}),
            principal: "ops".to_string(),
            enabled,
            cron: CronSpec {
                minute: minute.to_string(),
                ..CronSpec::default()
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_cronexp_normalization() {
        assert_eq!(cronexp("0, 30"), "0,30");
        assert_eq!(cronexp(""), "*");
        assert_eq!(cronexp("*"), "*");
    }

    #[test]
    fn test_display_renders_five_fields() {
        let spec = CronSpec {
            minute: "0, 30".to_string(),
            hour: "8".to_string(),
            ..CronSpec::default()
        };
        assert_eq!(spec.to_string(), "0,30 8 * * *");
    }

    #[test]
    fn test_field_matching() {
        assert!(field_matches("*", 17));
        assert!(field_matches("0,30", 30));
        assert!(!field_matches("0,30", 15));
        assert!(field_matches("10-20", 15));
        assert!(!field_matches("10-20", 25));
        assert!(field_matches("*/15", 45));
        assert!(!field_matches("*/15", 40));
        assert!(field_matches("10-20/5", 20));
        assert!(!field_matches("10-20/5", 12));
    }

    #[test]
    fn test_invalid_fields_never_match() {
        assert!(!field_matches("abc", 5));
        assert!(!field_matches("5-1", 3));
        assert!(!field_matches("*/0", 0));
    }

    #[test]
    fn test_validate() {
        assert!(CronSpec::default().validate().is_ok());
        assert!(
            CronSpec {
                minute: "0, 30".to_string(),
                ..CronSpec::default()
            }
            .validate()
            .is_ok()
        );
        assert!(
            CronSpec {
                hour: "25x".to_string(),
                ..CronSpec::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_matches_instant() {
        // Monday 2024-01-01 08:30 UTC.
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();

        assert!(CronSpec::default().matches(&at));
        assert!(
            CronSpec {
                minute: "30".to_string(),
                hour: "8".to_string(),
                ..CronSpec::default()
            }
            .matches(&at)
        );
        assert!(
            !CronSpec {
                minute: "0".to_string(),
                ..CronSpec::default()
            }
            .matches(&at)
        );
        // Monday is day 1.
        assert!(
            CronSpec {
                day_of_week: "1".to_string(),
                ..CronSpec::default()
            }
            .matches(&at)
        );
    }

    #[test]
    fn test_sunday_matches_zero_and_seven() {
        // Sunday 2024-01-07.
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();

        for expr in ["0", "7"] {
            assert!(
                CronSpec {
                    day_of_week: expr.to_string(),
                    ..CronSpec::default()
                }
                .matches(&at)
            );
        }
    }

    #[test]
    fn test_digest_is_stable() {
        let schedules = vec![schedule("0", true), schedule("30", true)];

        assert_eq!(
            compute_schedule_digest(&schedules),
            compute_schedule_digest(&schedules)
        );
    }

    #[test]
    fn test_digest_changes_with_enabled_set() {
        let first = schedule("0", true);
        let second = schedule("30", true);
        let all = vec![first.clone(), second];

        // Toggling a row's enabled flag removes it from the digest input.
        let remaining = vec![first];

        assert_ne!(
            compute_schedule_digest(&all),
            compute_schedule_digest(&remaining)
        );
    }

    #[test]
    fn test_digest_changes_with_cron_fields() {
        let mut schedules = vec![schedule("0", true)];
        let before = compute_schedule_digest(&schedules);

        schedules[0].cron.minute = "30".to_string();

        assert_ne!(before, compute_schedule_digest(&schedules));
    }

    #[test]
    fn test_entry_key_is_stable() {
        let s = schedule("0", true);
        assert_eq!(s.entry_key(), format!("schedule-{}", s.id));
        assert_eq!(s.entry_key(), s.entry_key());
    }
}
