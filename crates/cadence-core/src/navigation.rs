use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

use crate::bucket::week_bounds;
use crate::datetime::{
  add_days,
  assert_month_index,
  days_in_month,
  first_day_of_month,
  shift_months,
  today_in_project,
  with_month_clamped,
  with_year_clamped
};

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
  #[default]
  Month,
  Week,
  List
}

impl ViewMode {
  pub fn all() -> [Self; 3] {
    [Self::Month, Self::Week, Self::List]
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Month => "month",
      | Self::Week => "week",
      | Self::List => "list"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Month => "Month",
      | Self::Week => "Week",
      | Self::List => "List"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key {
      | "month" => Some(Self::Month),
      | "week" => Some(Self::Week),
      | "list" => Some(Self::List),
      | _ => None
    }
  }
}

impl FromStr for ViewMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::from_key(
      s.trim()
        .to_ascii_lowercase()
        .as_str()
    )
    .ok_or_else(|| {
      anyhow!(
        "unknown view mode: {s} \
         (expected month, week or list)"
      )
    })
  }
}

/// The displayed reference date plus the
/// active view mode. Every transition is
/// total and lands on a valid date.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct Navigation {
  reference_date: NaiveDate,
  pub view_mode:  ViewMode
}

impl Navigation {
  pub fn new(
    reference_date: NaiveDate
  ) -> Self {
    Self {
      reference_date,
      view_mode: ViewMode::default()
    }
  }

  pub fn reference_date(
    &self
  ) -> NaiveDate {
    self.reference_date
  }

  pub fn set_view_mode(
    &mut self,
    mode: ViewMode
  ) {
    debug!(
      from = self.view_mode.as_key(),
      to = mode.as_key(),
      "view mode changed"
    );
    self.view_mode = mode;
  }

  pub fn next_month(&mut self) {
    self.reference_date =
      shift_months(self.reference_date, 1);
  }

  pub fn previous_month(&mut self) {
    self.reference_date = shift_months(
      self.reference_date,
      -1
    );
  }

  pub fn next_week(&mut self) {
    self.reference_date =
      add_days(self.reference_date, 7);
  }

  pub fn previous_week(&mut self) {
    self.reference_date =
      add_days(self.reference_date, -7);
  }

  pub fn go_to_today(&mut self) {
    self.go_to_today_at(Utc::now());
  }

  pub fn go_to_today_at(
    &mut self,
    now: DateTime<Utc>
  ) {
    self.reference_date =
      today_in_project(now);
  }

  /// # Panics
  /// Panics when `month0` is outside
  /// 0..=11.
  pub fn select_month(
    &mut self,
    month0: u32
  ) {
    assert_month_index(month0);
    self.reference_date =
      with_month_clamped(
        self.reference_date,
        month0 + 1
      );
  }

  pub fn select_year(
    &mut self,
    year: i32
  ) {
    self.reference_date =
      with_year_clamped(
        self.reference_date,
        year
      );
  }

  /// Steps forward (`delta > 0`) or back
  /// by the unit of the active view;
  /// the list view pages by month.
  pub fn step(&mut self, delta: i32) {
    self.reference_date =
      match self.view_mode {
        | ViewMode::Month
        | ViewMode::List => shift_months(
          self.reference_date,
          delta
        ),
        | ViewMode::Week => {
          add_days(
            self.reference_date,
            i64::from(delta) * 7
          )
        }
      };
  }

  /// Inclusive date window shown by the
  /// active view; `None` for the list
  /// view, which is unbounded.
  pub fn displayed_range(
    &self
  ) -> Option<(NaiveDate, NaiveDate)> {
    let focus = self.reference_date;
    match self.view_mode {
      | ViewMode::Month => {
        let start = first_day_of_month(
          focus.year(),
          focus.month()
        )?;
        let end = add_days(
          start,
          i64::from(days_in_month(
            focus.year(),
            focus.month()
          )) - 1
        );
        Some((start, end))
      }
      | ViewMode::Week => {
        Some(week_bounds(focus))
      }
      | ViewMode::List => None
    }
  }

  pub fn title(&self) -> String {
    let focus = self.reference_date;
    match self.view_mode {
      | ViewMode::Month => {
        format!(
          "Month View {}",
          focus.format("%B %Y")
        )
      }
      | ViewMode::Week => {
        let (start, end) =
          week_bounds(focus);
        format!(
          "Week View {} - {}",
          start.format("%Y-%m-%d"),
          end.format("%Y-%m-%d")
        )
      }
      | ViewMode::List => {
        "List View".to_string()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    TimeZone,
    Utc
  };

  use super::{
    Navigation,
    ViewMode
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
  fn month_navigation_clamps_and_does_not_restore_day(
  ) {
    for (year, feb_last) in
      [(2023, 28), (2024, 29)]
    {
      let mut nav =
        Navigation::new(date(year, 1, 31));
      nav.next_month();
      assert_eq!(
        nav.reference_date(),
        date(year, 2, feb_last)
      );
      nav.previous_month();
      assert_eq!(
        nav.reference_date(),
        date(year, 1, feb_last)
      );
    }
  }

  #[test]
  fn week_navigation_moves_exactly_seven_days(
  ) {
    let mut nav =
      Navigation::new(date(2024, 12, 28));
    nav.next_week();
    assert_eq!(
      nav.reference_date(),
      date(2025, 1, 4)
    );
    nav.previous_week();
    nav.previous_week();
    assert_eq!(
      nav.reference_date(),
      date(2024, 12, 21)
    );
  }

  #[test]
  fn selecting_components_clamps_the_day() {
    let mut nav =
      Navigation::new(date(2024, 3, 31));
    nav.select_month(3);
    assert_eq!(
      nav.reference_date(),
      date(2024, 4, 30)
    );

    let mut leap =
      Navigation::new(date(2024, 2, 29));
    leap.select_year(2023);
    assert_eq!(
      leap.reference_date(),
      date(2023, 2, 28)
    );
  }

  #[test]
  #[should_panic(expected = "month index 12")]
  fn selecting_invalid_month_panics() {
    let mut nav =
      Navigation::new(date(2024, 3, 1));
    nav.select_month(12);
  }

  #[test]
  fn going_to_today_twice_at_one_instant_is_stable(
  ) {
    let now = Utc
      .with_ymd_and_hms(
        2024, 7, 4, 12, 0, 0
      )
      .single()
      .expect("valid now");
    let mut nav =
      Navigation::new(date(2020, 1, 1));

    nav.go_to_today_at(now);
    let first = nav.reference_date();
    nav.go_to_today_at(now);
    assert_eq!(nav.reference_date(), first);
  }

  #[test]
  fn step_follows_the_active_view() {
    let mut nav =
      Navigation::new(date(2024, 1, 15));
    nav.step(1);
    assert_eq!(
      nav.reference_date(),
      date(2024, 2, 15)
    );

    nav.set_view_mode(ViewMode::Week);
    nav.step(-1);
    assert_eq!(
      nav.reference_date(),
      date(2024, 2, 8)
    );

    nav.set_view_mode(ViewMode::List);
    nav.step(-2);
    assert_eq!(
      nav.reference_date(),
      date(2023, 12, 8)
    );
  }

  #[test]
  fn displayed_range_covers_month_or_week() {
    let mut nav =
      Navigation::new(date(2024, 2, 14));
    assert_eq!(
      nav.displayed_range(),
      Some((
        date(2024, 2, 1),
        date(2024, 2, 29)
      ))
    );

    nav.set_view_mode(ViewMode::Week);
    assert_eq!(
      nav.displayed_range(),
      Some((
        date(2024, 2, 11),
        date(2024, 2, 17)
      ))
    );
    assert_eq!(
      nav.title(),
      "Week View 2024-02-11 - 2024-02-17"
    );

    nav.set_view_mode(ViewMode::List);
    assert_eq!(nav.displayed_range(), None);
  }

  #[test]
  fn view_modes_parse_from_keys() {
    for mode in ViewMode::all() {
      assert_eq!(
        mode.as_key().parse::<ViewMode>()
          .expect("known key"),
        mode
      );
    }
    assert!(
      "agenda".parse::<ViewMode>().is_err()
    );
  }
}
