use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::datetime::{days_in_month, shift_months};
use crate::post::{ContentPost, ContentType, Platform, PostStatus};

fn at(anchor: NaiveDate, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let day = day.min(days_in_month(anchor.year(), anchor.month()));
    NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), day)?.and_hms_opt(hour, minute, 0)
}

fn post(
    id: &str,
    title: &str,
    description: &str,
    content_type: ContentType,
    platforms: &[Platform],
    status: PostStatus,
    tags: &[&str],
) -> ContentPost {
    let mut post = ContentPost::new(id, title, content_type, platforms.to_vec(), status);
    post.description = description.to_string();
    post.tags = tags.iter().map(|tag| tag.to_string()).collect();
    post.color = Some(platforms.first().map(|p| p.style().hex).unwrap_or("#6b7280").to_string());
    post
}

/// Demo collection spread over the month of `anchor`, with a couple of
/// entries in the previous month and one undated draft.
pub fn sample_posts(anchor: NaiveDate) -> Vec<ContentPost> {
    let previous = shift_months(anchor, -1);

    let mut launch = post(
        "1",
        "Spring collection launch",
        "Carousel of the new lineup with a swipe-up link.",
        ContentType::Carousel,
        &[Platform::Instagram, Platform::Facebook],
        PostStatus::Scheduled,
        &["launch", "spring"],
    );
    launch.scheduled_date = at(anchor, 15, 10, 0);

    let mut thread = post(
        "2",
        "Behind the scenes thread",
        "Short thread on how the collection was designed.",
        ContentType::Tweet,
        &[Platform::Twitter],
        PostStatus::Published,
        &["bts"],
    );
    thread.published_date = at(anchor, 15, 16, 30);

    let mut hiring = post(
        "3",
        "We're hiring: content lead",
        "Job post for the content team.",
        ContentType::Text,
        &[Platform::Linkedin],
        PostStatus::Scheduled,
        &["hiring"],
    );
    hiring.scheduled_date = at(anchor, 3, 9, 0);

    let mut tutorial = post(
        "4",
        "Styling tutorial",
        "Ten-minute walkthrough of three outfits.",
        ContentType::Video,
        &[Platform::Youtube],
        PostStatus::Failed,
        &["tutorial"],
    );
    tutorial.scheduled_date = at(anchor, 22, 18, 0);

    let mut reel = post(
        "5",
        "Weekend reel",
        "Quick cuts from the pop-up store.",
        ContentType::Reel,
        &[Platform::Instagram, Platform::Tiktok],
        PostStatus::Published,
        &["popup", "weekend"],
    );
    reel.published_date = at(previous, 28, 12, 0);

    let mut recap = post(
        "6",
        "Monthly recap story",
        "Highlights from last month.",
        ContentType::Story,
        &[Platform::Instagram],
        PostStatus::Published,
        &["recap"],
    );
    recap.published_date = at(anchor, 1, 8, 0);

    let idea = post(
        "7",
        "Customer spotlight (idea)",
        "Interview a long-time customer; no date yet.",
        ContentType::Image,
        &[Platform::Facebook],
        PostStatus::Draft,
        &["ideas"],
    );

    vec![launch, thread, hiring, tutorial, reel, recap, idea]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::sample_posts;

    #[test]
    fn sample_posts_have_unique_ids_and_platforms() {
        let anchor = NaiveDate::from_ymd_opt(2024, 2, 10).expect("valid date");
        let posts = sample_posts(anchor);

        let mut ids = posts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), posts.len());
        assert!(posts.iter().all(|p| !p.platforms.is_empty()));
        assert!(posts.iter().any(|p| p.effective_date().is_none()));
    }
}
