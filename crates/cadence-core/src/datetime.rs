use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

const TIMEZONE_CONFIG_FILE: &str =
  "cadence-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "CADENCE_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "CADENCE_TIME_CONFIG";
const DEFAULT_PROJECT_TIMEZONE: &str =
  "UTC";

const NAIVE_TIMESTAMP_FORMATS: [&str;
  4] = [
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

pub fn project_timezone() -> &'static Tz
{
  static PROJECT_TZ: OnceLock<Tz> =
    OnceLock::new();
  PROJECT_TZ.get_or_init(
    resolve_project_timezone
  )
}

/// The calendar date of `now` in the
/// project timezone.
#[must_use]
pub fn today_in_project(
  now: DateTime<Utc>
) -> NaiveDate {
  now
    .with_timezone(project_timezone())
    .date_naive()
}

fn resolve_project_timezone() -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(
        &raw,
        TIMEZONE_ENV_VAR
      )
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_PROJECT_TIMEZONE,
    "DEFAULT_PROJECT_TIMEZONE"
  )
  .unwrap_or(chrono_tz::UTC)
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured project timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

#[must_use]
pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0)
    || year % 400 == 0
}

/// Days in a 1-based `month`.
///
/// # Panics
/// Panics when `month` is outside
/// 1..=12.
#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  match month {
    | 1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
    | 4 | 6 | 9 | 11 => 30,
    | 2 => {
      if is_leap_year(year) {
        29
      } else {
        28
      }
    }
    | _ => {
      panic!(
        "month {month} is outside \
         1..=12"
      )
    }
  }
}

/// Zero-based month indices outside 0..12
/// are caller bugs; clamping would show
/// the wrong month.
pub(crate) fn assert_month_index(
  month0: u32
) {
  assert!(
    month0 < 12,
    "month index {month0} is outside \
     0..=11"
  );
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
}

/// Weekday index with Sunday as 0.
#[must_use]
pub fn weekday_from_sunday(
  date: NaiveDate
) -> u32 {
  date
    .weekday()
    .num_days_from_sunday()
}

/// `None` when the offset leaves the
/// range `chrono` can represent.
#[must_use]
pub fn checked_add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  Duration::try_days(days).and_then(
    |delta| {
      date.checked_add_signed(delta)
    }
  )
}

/// Saturating form of
/// [`checked_add_days`]: an
/// unrepresentable result keeps `date`.
#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  checked_add_days(date, days)
    .unwrap_or(date)
}

#[must_use]
pub fn start_of_week(
  date: NaiveDate
) -> NaiveDate {
  add_days(
    date,
    -i64::from(weekday_from_sunday(
      date
    ))
  )
}

fn clamped_date(
  year: i32,
  month: u32,
  day: u32
) -> Option<NaiveDate> {
  let day =
    day.min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
}

/// Moves by whole months, clamping the
/// day to the target month's length.
/// `None` past the supported years.
#[must_use]
pub fn checked_shift_months(
  date: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let total = i64::from(date.year())
    * 12
    + i64::from(date.month0())
    + i64::from(months);
  let year =
    i32::try_from(total.div_euclid(12))
      .ok()?;
  let month =
    total.rem_euclid(12) as u32 + 1;

  clamped_date(year, month, date.day())
}

#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  checked_shift_months(date, months)
    .unwrap_or(date)
}

#[must_use]
pub fn with_month_clamped(
  date: NaiveDate,
  month: u32
) -> NaiveDate {
  clamped_date(
    date.year(),
    month,
    date.day()
  )
  .unwrap_or(date)
}

#[must_use]
pub fn with_year_clamped(
  date: NaiveDate,
  year: i32
) -> NaiveDate {
  clamped_date(
    year,
    date.month(),
    date.day()
  )
  .unwrap_or(date)
}

/// Parses a post timestamp into a local
/// wall-clock value. Offset-bearing
/// values are moved into the project
/// timezone; bare dates land at midnight.
pub fn parse_post_timestamp(
  raw: &str
) -> Option<NaiveDateTime> {
  let token = raw.trim();
  if token.is_empty() {
    return None;
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Some(
      dt.with_timezone(
        project_timezone()
      )
      .naive_local()
    );
  }

  for fmt in NAIVE_TIMESTAMP_FORMATS {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Some(ndt);
    }
  }

  NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
}

/// Resolves a reference-date expression
/// relative to `today`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return Ok(add_days(today, 1));
    }
    | "yesterday" => {
      return Ok(add_days(today, -1));
    }
    | _ => {}
  }

  if let Some(month) =
    parse_month_name(&lower)
  {
    return first_day_of_month(
      today.year(),
      month
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid month value: {month}"
      )
    });
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwm])$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;

  if let Some(caps) =
    rel_re.captures(&lower)
  {
    let negative = caps
      .name("sign")
      .is_some_and(|m| m.as_str() == "-");
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let num =
      if negative { -num } else { num };
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let shifted = match unit {
      | "d" => checked_add_days(today, num),
      | "w" => {
        num.checked_mul(7).and_then(
          |days| {
            checked_add_days(today, days)
          }
        )
      }
      | "m" => {
        i32::try_from(num).ok().and_then(
          |months| {
            checked_shift_months(
              today, months
            )
          }
        )
      }
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ));
      }
    };

    return shifted.ok_or_else(|| {
      anyhow!(
        "relative date {token} is out \
         of range"
      )
    });
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      &format!("{token}-01"),
      "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, month \
     names (e.g. march), +Nd/-Nw/+Nm, \
     YYYY-MM-DD, YYYY-MM"
  })
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    DateTime,
    NaiveDate
  };

  use super::{
    days_in_month,
    parse_date_expr,
    parse_post_timestamp,
    project_timezone,
    shift_months,
    start_of_week,
    with_year_clamped
  };

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn february_follows_gregorian_leap_rules(
  ) {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(1900, 2), 28);
    assert_eq!(days_in_month(2000, 2), 29);
  }

  #[test]
  fn shift_months_clamps_and_crosses_years(
  ) {
    assert_eq!(
      shift_months(date(2023, 1, 31), 1),
      date(2023, 2, 28)
    );
    assert_eq!(
      shift_months(date(2024, 12, 15), 1),
      date(2025, 1, 15)
    );
    assert_eq!(
      shift_months(date(2024, 1, 10), -1),
      date(2023, 12, 10)
    );
    assert_eq!(
      shift_months(date(2024, 3, 31), -13),
      date(2023, 2, 28)
    );
  }

  #[test]
  fn leap_day_clamps_when_year_changes() {
    assert_eq!(
      with_year_clamped(
        date(2024, 2, 29),
        2025
      ),
      date(2025, 2, 28)
    );
  }

  #[test]
  fn week_starts_on_sunday() {
    // 2024-03-13 is a Wednesday.
    assert_eq!(
      start_of_week(date(2024, 3, 13)),
      date(2024, 3, 10)
    );
    assert_eq!(
      start_of_week(date(2024, 3, 10)),
      date(2024, 3, 10)
    );
  }

  #[test]
  fn parses_naive_and_date_only_timestamps(
  ) {
    let parsed = parse_post_timestamp(
      "2024-03-15T09:30:00"
    )
    .expect("naive timestamp");
    assert_eq!(
      parsed.date(),
      date(2024, 3, 15)
    );

    let midnight =
      parse_post_timestamp("2024-03-15")
        .expect("date only");
    assert_eq!(
      midnight.format("%H:%M").to_string(),
      "00:00"
    );

    assert!(
      parse_post_timestamp("soon")
        .is_none()
    );
  }

  #[test]
  fn parses_relative_expressions() {
    let today = date(2024, 1, 31);
    assert_eq!(
      parse_date_expr("+1m", today)
        .expect("month offset"),
      date(2024, 2, 29)
    );
    assert_eq!(
      parse_date_expr("-2w", today)
        .expect("week offset"),
      date(2024, 1, 17)
    );
    assert_eq!(
      parse_date_expr("tomorrow", today)
        .expect("tomorrow"),
      date(2024, 2, 1)
    );
  }

  #[test]
  fn offset_timestamps_move_into_project_timezone(
  ) {
    let raw = "2024-03-15T23:30:00-05:00";
    let parsed = parse_post_timestamp(raw)
      .expect("rfc3339 timestamp");
    let expected =
      DateTime::parse_from_rfc3339(raw)
        .expect("valid rfc3339")
        .with_timezone(project_timezone())
        .naive_local();
    assert_eq!(parsed, expected);

    if *project_timezone() == chrono_tz::UTC
    {
      assert_eq!(
        parsed.date(),
        date(2024, 3, 16)
      );
      assert_eq!(
        parsed.format("%H:%M").to_string(),
        "04:30"
      );
    }
  }

  #[test]
  fn huge_relative_offsets_are_errors() {
    let today = date(2024, 1, 1);
    for expr in [
      "+999999999999999d",
      "+2000000000000000000w",
      "-9999999999m",
      "+99999999999999999999d"
    ] {
      let err = parse_date_expr(expr, today)
        .expect_err(expr);
      assert!(
        !err.to_string().is_empty(),
        "{expr}"
      );
    }

    let err =
      parse_date_expr("+999999999999999d", today)
        .expect_err("day overflow");
    assert!(
      err.to_string().contains("out of range")
    );
  }

  #[test]
  fn parses_month_and_absolute_forms() {
    let today = date(2024, 6, 2);
    assert_eq!(
      parse_date_expr("march", today)
        .expect("month name"),
      date(2024, 3, 1)
    );
    assert_eq!(
      parse_date_expr("2025-07", today)
        .expect("year-month"),
      date(2025, 7, 1)
    );
    assert!(
      parse_date_expr("someday", today)
        .is_err()
    );
  }
}

pub mod post_date_serde {
  const FORMAT: &str =
    "%Y-%m-%dT%H:%M:%S";

  pub mod option {
    use chrono::NaiveDateTime;
    use serde::{
      Deserialize,
      Deserializer,
      Serializer
    };

    pub fn serialize<S>(
      dt: &Option<NaiveDateTime>,
      serializer: S
    ) -> Result<S::Ok, S::Error>
    where
      S: Serializer
    {
      match dt {
        | Some(value) => {
          serializer.serialize_str(
            &value
              .format(super::FORMAT)
              .to_string()
          )
        }
        | None => {
          serializer.serialize_none()
        }
      }
    }

    /// Unparseable values become `None`
    /// so the post drops out of date
    /// views instead of failing the load.
    pub fn deserialize<'de, D>(
      deserializer: D
    ) -> Result<
      Option<NaiveDateTime>,
      D::Error
    >
    where
      D: Deserializer<'de>
    {
      let opt =
        Option::<String>::deserialize(
          deserializer
        )?;
      let Some(raw) = opt else {
        return Ok(None);
      };

      let parsed =
        crate::datetime::parse_post_timestamp(
          &raw
        );
      if parsed.is_none() {
        tracing::warn!(
          value = %raw,
          "unparseable post date; \
           treating as undated"
        );
      }
      Ok(parsed)
    }
  }
}
