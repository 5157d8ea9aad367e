use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::datetime::post_date_serde;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Twitter,
    Linkedin,
    Tiktok,
    Youtube,
    Facebook,
}

impl Platform {
    pub const ALL: [Self; 6] = [
        Self::Instagram,
        Self::Twitter,
        Self::Linkedin,
        Self::Tiktok,
        Self::Youtube,
        Self::Facebook,
    ];

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Tiktok => "tiktok",
            Self::Youtube => "youtube",
            Self::Facebook => "facebook",
        }
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_key() == key)
            .ok_or_else(|| {
                anyhow!(
                    "unknown platform: {s} (expected one of instagram, twitter, linkedin, \
                     tiktok, youtube, facebook)"
                )
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Scheduled, Self::Published, Self::Failed];

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for PostStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_key() == key)
            .ok_or_else(|| {
                anyhow!("unknown status: {s} (expected one of draft, scheduled, published, failed)")
            })
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Carousel,
    Text,
    Story,
    Reel,
    Tweet,
}

impl ContentType {
    pub const ALL: [Self; 7] = [
        Self::Image,
        Self::Video,
        Self::Carousel,
        Self::Text,
        Self::Story,
        Self::Reel,
        Self::Tweet,
    ];

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Carousel => "carousel",
            Self::Text => "text",
            Self::Story => "story",
            Self::Reel => "reel",
            Self::Tweet => "tweet",
        }
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_key() == key)
            .ok_or_else(|| {
                anyhow!(
                    "unknown content type: {s} (expected one of image, video, carousel, text, \
                     story, reel, tweet)"
                )
            })
    }
}

/// A piece of content placed on the calendar.
///
/// Dates are local wall-clock values; the store converts offset-bearing
/// timestamps into the project timezone before they get here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPost {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub content_type: ContentType,

    pub platforms: Vec<Platform>,

    pub status: PostStatus,

    #[serde(default, with = "post_date_serde::option")]
    pub scheduled_date: Option<NaiveDateTime>,

    #[serde(default, with = "post_date_serde::option")]
    pub published_date: Option<NaiveDateTime>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub color: Option<String>,
}

impl ContentPost {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentType,
        platforms: Vec<Platform>,
        status: PostStatus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            content_type,
            platforms,
            status,
            scheduled_date: None,
            published_date: None,
            tags: vec![],
            color: None,
        }
    }

    /// The date used for calendar placement: scheduled wins over published.
    pub fn effective_date(&self) -> Option<NaiveDateTime> {
        self.scheduled_date.or(self.published_date)
    }

    pub fn is_on(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}
