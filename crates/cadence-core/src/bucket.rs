use chrono::{
  Datelike,
  NaiveDate
};
use serde::Serialize;
use tracing::debug;

use crate::datetime::{
  add_days,
  assert_month_index,
  start_of_week
};
use crate::post::{
  ContentPost,
  PostStatus
};

fn effective_day(
  post: &ContentPost
) -> Option<NaiveDate> {
  post
    .effective_date()
    .map(|dt| dt.date())
}

/// Posts whose effective date is the
/// given local day. `month0` is
/// zero-based.
///
/// # Panics
/// Panics when `month0` is outside
/// 0..=11.
pub fn posts_for_day<'a>(
  filtered: &[&'a ContentPost],
  year: i32,
  month0: u32,
  day: u32
) -> Vec<&'a ContentPost> {
  assert_month_index(month0);

  filtered
    .iter()
    .copied()
    .filter(|post| {
      effective_day(post).is_some_and(
        |date| {
          date.year() == year
            && date.month0() == month0
            && date.day() == day
        }
      )
    })
    .collect()
}

/// Sunday-first week containing
/// `reference`, inclusive on both ends.
#[must_use]
pub fn week_bounds(
  reference: NaiveDate
) -> (NaiveDate, NaiveDate) {
  let start = start_of_week(reference);
  (start, add_days(start, 6))
}

#[tracing::instrument(skip(filtered), fields(total = filtered.len()))]
pub fn posts_for_week<'a>(
  filtered: &[&'a ContentPost],
  reference: NaiveDate
) -> Vec<&'a ContentPost> {
  let (start, end) =
    week_bounds(reference);
  let bucket = posts_in_range(
    filtered, start, end
  );

  debug!(
    %start,
    %end,
    count = bucket.len(),
    "week bucket collected"
  );
  bucket
}

/// Posts whose effective day lies in
/// `start..=end`.
pub fn posts_in_range<'a>(
  filtered: &[&'a ContentPost],
  start: NaiveDate,
  end: NaiveDate
) -> Vec<&'a ContentPost> {
  filtered
    .iter()
    .copied()
    .filter(|post| {
      effective_day(post).is_some_and(
        |day| day >= start && day <= end
      )
    })
    .collect()
}

/// Ordering for the list view: dated
/// posts by effective date and time,
/// then undated posts in input order.
pub fn list_view<'a>(
  filtered: &[&'a ContentPost]
) -> Vec<&'a ContentPost> {
  let mut ordered = filtered.to_vec();
  ordered.sort_by_key(|post| {
    let when = post.effective_date();
    (when.is_none(), when)
  });
  ordered
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct PostSummary {
  pub total:     usize,
  pub draft:     usize,
  pub scheduled: usize,
  pub published: usize,
  pub failed:    usize
}

impl PostSummary {
  fn push(
    &mut self,
    status: PostStatus
  ) {
    self.total += 1;
    match status {
      | PostStatus::Draft => {
        self.draft += 1
      }
      | PostStatus::Scheduled => {
        self.scheduled += 1
      }
      | PostStatus::Published => {
        self.published += 1
      }
      | PostStatus::Failed => {
        self.failed += 1
      }
    }
  }
}

pub fn summarize_posts(
  posts: &[&ContentPost]
) -> PostSummary {
  let mut summary =
    PostSummary::default();
  for post in posts {
    summary.push(post.status);
  }
  summary
}
