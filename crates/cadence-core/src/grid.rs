use tracing::debug;

use crate::bucket::posts_for_day;
use crate::datetime::{
  assert_month_index,
  days_in_month,
  first_day_of_month,
  weekday_from_sunday
};
use crate::post::ContentPost;

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarCell<'a> {
  Empty,
  Day {
    day_number: u32,
    posts:      Vec<&'a ContentPost>
  }
}

impl<'a> CalendarCell<'a> {
  pub fn day_number(&self) -> Option<u32> {
    match self {
      | Self::Empty => None,
      | Self::Day {
        day_number,
        ..
      } => Some(*day_number)
    }
  }

  pub fn posts(
    &self
  ) -> &[&'a ContentPost] {
    match self {
      | Self::Empty => &[],
      | Self::Day {
        posts, ..
      } => posts
    }
  }
}

struct MonthLayout {
  leading:  usize,
  days:     u32,
  trailing: usize
}

fn month_layout(
  year: i32,
  month0: u32
) -> MonthLayout {
  assert_month_index(month0);
  let month = month0 + 1;

  let Some(first) =
    first_day_of_month(year, month)
  else {
    panic!(
      "year {year} is outside the \
       supported calendar range"
    );
  };

  let leading =
    weekday_from_sunday(first) as usize;
  let days = days_in_month(year, month);
  let used = leading + days as usize;
  let total = used
    .div_ceil(DAYS_PER_WEEK)
    * DAYS_PER_WEEK;

  MonthLayout {
    leading,
    days,
    trailing: total - used
  }
}

fn layout_cells<'a>(
  year: i32,
  month0: u32,
  mut posts_for: impl FnMut(u32) -> Vec<&'a ContentPost>
) -> Vec<CalendarCell<'a>> {
  let layout =
    month_layout(year, month0);
  let mut cells = Vec::with_capacity(
    layout.leading
      + layout.days as usize
      + layout.trailing
  );

  cells.extend(
    std::iter::repeat_with(|| {
      CalendarCell::Empty
    })
    .take(layout.leading)
  );
  for day_number in 1..=layout.days {
    cells.push(CalendarCell::Day {
      day_number,
      posts: posts_for(day_number)
    });
  }
  cells.extend(
    std::iter::repeat_with(|| {
      CalendarCell::Empty
    })
    .take(layout.trailing)
  );

  debug!(
    year,
    month0,
    leading = layout.leading,
    trailing = layout.trailing,
    cells = cells.len(),
    "built month grid"
  );
  cells
}

/// Sunday-first grid for a month:
/// leading padding, one cell per day,
/// trailing padding to a whole week.
///
/// # Panics
/// Panics when `month0` is outside
/// 0..=11 or the year is outside the
/// range `chrono` can represent.
pub fn build_month_grid(
  year: i32,
  month0: u32
) -> Vec<CalendarCell<'static>> {
  layout_cells(year, month0, |_| {
    Vec::new()
  })
}

/// Same layout as [`build_month_grid`]
/// with each day holding its bucket of
/// `filtered`.
pub fn month_grid_with_posts<'a>(
  filtered: &[&'a ContentPost],
  year: i32,
  month0: u32
) -> Vec<CalendarCell<'a>> {
  layout_cells(year, month0, |day| {
    posts_for_day(
      filtered, year, month0, day
    )
  })
}

pub fn weeks<'c, 'a>(
  cells: &'c [CalendarCell<'a>]
) -> impl Iterator<Item = &'c [CalendarCell<'a>]>
{
  cells.chunks(DAYS_PER_WEEK)
}
