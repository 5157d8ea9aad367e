use std::fmt;
use std::str::FromStr;

use serde::{
  Deserialize,
  Serialize
};
use tracing::trace;

use crate::post::{
  ContentPost,
  Platform,
  PostStatus
};

/// `All` or one specific value of `T`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Selection<T> {
  All,
  Only(T)
}

impl<T> Default for Selection<T> {
  fn default() -> Self {
    Self::All
  }
}

impl<T: PartialEq> Selection<T> {
  pub fn admits(
    &self,
    value: &T
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Only(wanted) => {
        wanted == value
      }
    }
  }
}

impl<T> FromStr for Selection<T>
where
  T: FromStr<Err = anyhow::Error>
{
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    if s.trim().eq_ignore_ascii_case("all")
    {
      return Ok(Self::All);
    }
    s.parse::<T>().map(Self::Only)
  }
}

impl<T: fmt::Display> fmt::Display
  for Selection<T>
{
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::All => f.write_str("all"),
      | Self::Only(value) => {
        write!(f, "{value}")
      }
    }
  }
}

pub type PlatformFilter =
  Selection<Platform>;
pub type StatusFilter =
  Selection<PostStatus>;

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct FilterState {
  pub platform: PlatformFilter,
  pub status:   StatusFilter,
  /// Case-insensitive text search over
  /// title, description and tags.
  #[serde(default)]
  pub query:    Option<String>
}

impl FilterState {
  pub fn new(
    platform: PlatformFilter,
    status: StatusFilter
  ) -> Self {
    Self {
      platform,
      status,
      query: None
    }
  }

  pub fn is_unfiltered(&self) -> bool {
    self.platform == Selection::All
      && self.status == Selection::All
      && self.normalized_query().is_none()
  }

  pub fn matches(
    &self,
    post: &ContentPost
  ) -> bool {
    let platform_ok = match self.platform
    {
      | Selection::All => true,
      | Selection::Only(platform) => {
        post.is_on(platform)
      }
    };

    platform_ok
      && self.status.admits(&post.status)
      && self.query_matches(post)
  }

  fn normalized_query(
    &self
  ) -> Option<String> {
    self
      .query
      .as_deref()
      .map(str::trim)
      .filter(|q| !q.is_empty())
      .map(str::to_lowercase)
  }

  fn query_matches(
    &self,
    post: &ContentPost
  ) -> bool {
    let Some(q) =
      self.normalized_query()
    else {
      return true;
    };

    post.title.to_lowercase().contains(&q)
      || post
        .description
        .to_lowercase()
        .contains(&q)
      || post.tags.iter().any(|tag| {
        tag.to_lowercase().contains(&q)
      })
  }
}

/// Order-preserving subset of `posts`
/// passing every active filter.
#[tracing::instrument(skip(posts), fields(total = posts.len()))]
pub fn filter_posts<'a>(
  posts: &'a [ContentPost],
  filter: &FilterState
) -> Vec<&'a ContentPost> {
  let kept = posts
    .iter()
    .filter(|post| filter.matches(post))
    .collect::<Vec<_>>();

  trace!(
    kept = kept.len(),
    platform = %filter.platform,
    status = %filter.status,
    "filtered posts"
  );
  kept
}

#[cfg(test)]
mod tests {
  use super::{
    FilterState,
    Selection,
    filter_posts
  };
  use crate::post::{
    ContentPost,
    ContentType,
    Platform,
    PostStatus
  };

  fn post(
    id: &str,
    platforms: Vec<Platform>,
    status: PostStatus
  ) -> ContentPost {
    ContentPost::new(
      id,
      format!("post {id}"),
      ContentType::Image,
      platforms,
      status
    )
  }

  fn ids(
    posts: &[&ContentPost]
  ) -> Vec<String> {
    posts
      .iter()
      .map(|p| p.id.clone())
      .collect()
  }

  #[test]
  fn platform_and_status_are_combined_with_and(
  ) {
    let posts = vec![
      post(
        "A",
        vec![Platform::Instagram],
        PostStatus::Published
      ),
      post(
        "B",
        vec![Platform::Instagram],
        PostStatus::Draft
      ),
      post(
        "C",
        vec![Platform::Twitter],
        PostStatus::Published
      ),
    ];

    let filter = FilterState::new(
      Selection::Only(
        Platform::Instagram
      ),
      Selection::Only(
        PostStatus::Published
      )
    );

    assert_eq!(
      ids(&filter_posts(&posts, &filter)),
      vec!["A"]
    );
  }

  #[test]
  fn default_filter_keeps_everything_in_order(
  ) {
    let posts = vec![
      post(
        "3",
        vec![Platform::Youtube],
        PostStatus::Failed
      ),
      post(
        "1",
        vec![Platform::Linkedin],
        PostStatus::Draft
      ),
    ];

    let filter = FilterState::default();
    assert!(filter.is_unfiltered());
    assert_eq!(
      ids(&filter_posts(&posts, &filter)),
      vec!["3", "1"]
    );
  }

  #[test]
  fn platform_filter_matches_any_listed_platform(
  ) {
    let posts = vec![post(
      "multi",
      vec![
        Platform::Twitter,
        Platform::Facebook,
      ],
      PostStatus::Scheduled
    )];

    let filter = FilterState::new(
      Selection::Only(
        Platform::Facebook
      ),
      Selection::All
    );
    assert_eq!(
      filter_posts(&posts, &filter).len(),
      1
    );
  }

  #[test]
  fn query_searches_title_description_and_tags(
  ) {
    let mut launch = post(
      "launch",
      vec![Platform::Tiktok],
      PostStatus::Draft
    );
    launch.tags =
      vec!["ProductLaunch".to_string()];
    let other = post(
      "other",
      vec![Platform::Tiktok],
      PostStatus::Draft
    );
    let posts = vec![launch, other];

    let filter = FilterState {
      query: Some(
        "  productlaunch ".to_string()
      ),
      ..FilterState::default()
    };
    assert_eq!(
      ids(&filter_posts(&posts, &filter)),
      vec!["launch"]
    );
  }

  #[test]
  fn selections_parse_from_keys() {
    let platform: Selection<Platform> =
      "Instagram"
        .parse()
        .expect("platform");
    assert_eq!(
      platform,
      Selection::Only(
        Platform::Instagram
      )
    );

    let status: Selection<PostStatus> =
      "all".parse().expect("all");
    assert_eq!(status, Selection::All);

    assert!(
      "myspace"
        .parse::<Selection<Platform>>()
        .is_err()
    );
  }
}
