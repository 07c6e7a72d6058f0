use k8s_openapi::chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};

#[cfg(test)]
#[path = "./schedule.tests.rs"]
mod schedule_tests;

const SEARCH_YEARS: i32 = 5;
const MONTH_NAMES: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Standard 5 fields cron schedule, evaluated in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: u64,
    hours: u64,
    days: u64,
    months: u64,
    weekdays: u64,
    any_day: bool,
    any_weekday: bool,
}

impl CronSchedule {
    /// Parses cron expression, e.g. `*/5 * * * *` or `@daily`.
    pub fn parse(expression: &str) -> Option<Self> {
        let expression = match expression.trim() {
            "@yearly" | "@annually" => "0 0 1 1 *",
            "@monthly" => "0 0 1 * *",
            "@weekly" => "0 0 * * 0",
            "@daily" | "@midnight" => "0 0 * * *",
            "@hourly" => "0 * * * *",
            other => other,
        };

        let fields = expression.split_whitespace().collect::<Vec<_>>();
        let [minutes, hours, days, months, weekdays] = fields.as_slice() else {
            return None;
        };

        let mut weekdays_bits = parse_field(weekdays, 0, 7, &WEEKDAY_NAMES, 0)?;
        if weekdays_bits & (1 << 7) != 0 {
            weekdays_bits |= 1;
        }

        Some(Self {
            minutes: parse_field(minutes, 0, 59, &[], 0)?,
            hours: parse_field(hours, 0, 23, &[], 0)?,
            days: parse_field(days, 1, 31, &[], 0)?,
            months: parse_field(months, 1, 12, &MONTH_NAMES, 1)?,
            weekdays: weekdays_bits,
            any_day: days.starts_with(['*', '?']),
            any_weekday: weekdays.starts_with(['*', '?']),
        })
    }

    /// Returns the first scheduled time after `time`.
    pub fn next_after(&self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut current = time
            .naive_utc()
            .with_second(0)?
            .with_nanosecond(0)?
            .checked_add_signed(TimeDelta::minutes(1))?;
        let last_year = current.year().saturating_add(SEARCH_YEARS);

        while current.year() <= last_year {
            if !has_bit(self.months, current.month()) {
                current = midnight(current.date().with_day(1)?.checked_add_months(Months::new(1))?);
            } else if !self.matches_day(current.date()) {
                current = midnight(current.date().succ_opt()?);
            } else if !has_bit(self.hours, current.hour()) {
                current = current.with_minute(0)?.checked_add_signed(TimeDelta::hours(1))?;
            } else if !has_bit(self.minutes, current.minute()) {
                current = current.checked_add_signed(TimeDelta::minutes(1))?;
            } else {
                return Some(current.and_utc());
            }
        }

        None
    }

    fn matches_day(&self, date: NaiveDate) -> bool {
        let day = has_bit(self.days, date.day());
        let weekday = has_bit(self.weekdays, date.weekday().num_days_from_sunday());
        if self.any_day || self.any_weekday {
            day && weekday
        } else {
            day || weekday
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn has_bit(bits: u64, value: u32) -> bool {
    value < 64 && bits & (1 << value) != 0
}

fn parse_field(field: &str, min: u32, max: u32, names: &[&str], names_offset: u32) -> Option<u64> {
    let value = |text: &str| -> Option<u32> {
        text.parse::<u32>().ok().or_else(|| {
            let lowercase = text.to_ascii_lowercase();
            names
                .iter()
                .position(|n| *n == lowercase)
                .and_then(|i| u32::try_from(i).ok())
                .map(|i| i + names_offset)
        })
    };

    let mut bits = 0;
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, step.parse::<u32>().ok().filter(|s| *s > 0)?),
            None => (part, 1),
        };

        let (start, end) = if range == "*" || range == "?" {
            (min, max)
        } else if let Some((start, end)) = range.split_once('-') {
            (value(start)?, value(end)?)
        } else {
            let start = value(range)?;
            (start, if step > 1 { max } else { start })
        };

        if start < min || end > max || start > end {
            return None;
        }

        for v in (start..=end).step_by(step as usize) {
            bits |= 1 << v;
        }
    }

    Some(bits)
}
