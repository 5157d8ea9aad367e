use chrono::{
  DateTime,
  NaiveDate,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

use crate::filter::{
  FilterState,
  PlatformFilter,
  StatusFilter
};
use crate::navigation::{
  Navigation,
  ViewMode
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModalId {
  PostDetails,
  CreatePost,
  AiAssistant,
  Insights
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(
  tag = "type",
  content = "value",
  rename_all = "snake_case"
)]
pub enum Action {
  NextPeriod,
  PreviousPeriod,
  NextMonth,
  PreviousMonth,
  NextWeek,
  PreviousWeek,
  GoToToday(DateTime<Utc>),
  SelectMonth(u32),
  SelectYear(i32),
  SetViewMode(ViewMode),
  SetPlatformFilter(PlatformFilter),
  SetStatusFilter(StatusFilter),
  SetQuery(Option<String>),
  SetFilter(FilterState),
  ClearFilters,
  SelectPost(String),
  OpenModal(ModalId),
  CloseModal
}

/// Everything one calendar session
/// needs to render, owned by a single
/// controller and changed only through
/// [`Action`]s. At most one modal is
/// open at a time.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct ViewState {
  pub navigation:    Navigation,
  pub filter:        FilterState,
  pub selected_post: Option<String>,
  pub open_modal:    Option<ModalId>
}

impl ViewState {
  pub fn new(
    reference_date: NaiveDate
  ) -> Self {
    Self {
      navigation:    Navigation::new(
        reference_date
      ),
      filter:        FilterState::default(),
      selected_post: None,
      open_modal:    None
    }
  }

  #[must_use]
  pub fn reduce(
    mut self,
    action: Action
  ) -> Self {
    self.apply(action);
    self
  }

  /// Applies `action` in place and
  /// returns the modal it closed, if any,
  /// so the host can stop work tied to
  /// that panel.
  pub fn apply(
    &mut self,
    action: Action
  ) -> Option<ModalId> {
    debug!(?action, "applying view action");
    let nav = &mut self.navigation;

    match action {
      | Action::NextPeriod => nav.step(1),
      | Action::PreviousPeriod => {
        nav.step(-1)
      }
      | Action::NextMonth => {
        nav.next_month()
      }
      | Action::PreviousMonth => {
        nav.previous_month()
      }
      | Action::NextWeek => nav.next_week(),
      | Action::PreviousWeek => {
        nav.previous_week()
      }
      | Action::GoToToday(now) => {
        nav.go_to_today_at(now)
      }
      | Action::SelectMonth(month0) => {
        nav.select_month(month0)
      }
      | Action::SelectYear(year) => {
        nav.select_year(year)
      }
      | Action::SetViewMode(mode) => {
        nav.set_view_mode(mode)
      }
      | Action::SetPlatformFilter(
        platform
      ) => self.filter.platform = platform,
      | Action::SetStatusFilter(status) => {
        self.filter.status = status
      }
      | Action::SetQuery(query) => {
        self.filter.query = query
      }
      | Action::SetFilter(filter) => {
        self.filter = filter
      }
      | Action::ClearFilters => {
        self.filter =
          FilterState::default()
      }
      | Action::SelectPost(id) => {
        self.selected_post = Some(id);
        return self.open(
          ModalId::PostDetails
        );
      }
      | Action::OpenModal(modal) => {
        return self.open(modal);
      }
      | Action::CloseModal => {
        return self.close();
      }
    }

    None
  }

  fn open(
    &mut self,
    modal: ModalId
  ) -> Option<ModalId> {
    let previous =
      self.open_modal.replace(modal);
    match previous {
      | Some(prev) if prev != modal => {
        if prev == ModalId::PostDetails {
          self.selected_post = None;
        }
        Some(prev)
      }
      | _ => None
    }
  }

  fn close(
    &mut self
  ) -> Option<ModalId> {
    let closed = self.open_modal.take();
    if closed
      == Some(ModalId::PostDetails)
    {
      self.selected_post = None;
    }
    closed
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    Action,
    ModalId,
    ViewState
  };
  use crate::filter::{
    FilterState,
    Selection
  };
  use crate::navigation::ViewMode;
  use crate::post::{
    Platform,
    PostStatus
  };

  fn state() -> ViewState {
    ViewState::new(
      NaiveDate::from_ymd_opt(2024, 1, 31)
        .expect("valid date")
    )
  }

  #[test]
  fn opening_a_modal_closes_the_previous_one(
  ) {
    let mut view = state();
    assert_eq!(
      view.apply(Action::OpenModal(
        ModalId::AiAssistant
      )),
      None
    );
    assert_eq!(
      view.apply(Action::OpenModal(
        ModalId::Insights
      )),
      Some(ModalId::AiAssistant)
    );
    assert_eq!(
      view.open_modal,
      Some(ModalId::Insights)
    );
  }

  #[test]
  fn selecting_a_post_opens_details_and_closing_clears_it(
  ) {
    let mut view = state();
    view.apply(Action::SelectPost(
      "42".to_string()
    ));
    assert_eq!(
      view.open_modal,
      Some(ModalId::PostDetails)
    );
    assert_eq!(
      view.selected_post.as_deref(),
      Some("42")
    );

    assert_eq!(
      view.apply(Action::CloseModal),
      Some(ModalId::PostDetails)
    );
    assert!(view.selected_post.is_none());
    assert!(view.open_modal.is_none());
  }

  #[test]
  fn reducer_routes_navigation_and_filters(
  ) {
    let view = state()
      .reduce(Action::NextMonth)
      .reduce(Action::SetViewMode(
        ViewMode::Week
      ))
      .reduce(Action::SetPlatformFilter(
        Selection::Only(
          Platform::Twitter
        )
      ));

    assert_eq!(
      view.navigation.reference_date(),
      NaiveDate::from_ymd_opt(2024, 2, 29)
        .expect("valid date")
    );
    assert_eq!(
      view.navigation.view_mode,
      ViewMode::Week
    );
    assert_eq!(
      view.filter.platform,
      Selection::Only(Platform::Twitter)
    );

    let cleared =
      view.reduce(Action::ClearFilters);
    assert!(cleared.filter.is_unfiltered());
  }

  #[test]
  fn set_filter_replaces_every_field() {
    let view = state()
      .reduce(Action::SetQuery(Some(
        "launch".to_string()
      )))
      .reduce(Action::SetFilter(
        FilterState::new(
          Selection::All,
          Selection::Only(
            PostStatus::Draft
          )
        )
      ));

    assert_eq!(
      view.filter.status,
      Selection::Only(PostStatus::Draft)
    );
    assert_eq!(view.filter.query, None);
    assert_eq!(
      view.filter.platform,
      Selection::All
    );
  }

  #[test]
  fn view_state_serializes_round_trip() {
    let view = state().reduce(
      Action::OpenModal(
        ModalId::CreatePost
      )
    );
    let json = serde_json::to_string(
      &view
    )
    .expect("serialize");
    assert!(json.contains("create_post"));

    let back: ViewState =
      serde_json::from_str(&json)
        .expect("deserialize");
    assert_eq!(back, view);
  }
}
