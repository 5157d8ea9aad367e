use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::post::ContentPost;

const POSTS_FILE: &str = "posts.json";

#[derive(Debug)]
pub struct PostStore {
    pub data_dir: PathBuf,
    pub posts_path: PathBuf,
}

impl PostStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let posts_path = data_dir.join(POSTS_FILE);
        info!(
            data_dir = %data_dir.display(),
            posts = %posts_path.display(),
            "opened post store"
        );

        Ok(Self {
            data_dir,
            posts_path,
        })
    }

    pub fn has_posts_file(&self) -> bool {
        self.posts_path.exists()
    }

    #[tracing::instrument(skip(self))]
    pub fn load_posts(&self) -> anyhow::Result<Vec<ContentPost>> {
        if !self.has_posts_file() {
            warn!(
                file = %self.posts_path.display(),
                "posts file missing; run `cadence init` for sample data"
            );
            return Ok(vec![]);
        }

        let raw = fs::read_to_string(&self.posts_path)
            .with_context(|| format!("failed reading {}", self.posts_path.display()))?;
        let posts: Vec<ContentPost> = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing {}", self.posts_path.display()))?;
        validate_posts(&posts)
            .with_context(|| format!("invalid posts in {}", self.posts_path.display()))?;

        debug!(count = posts.len(), "loaded posts");
        Ok(posts)
    }

    #[tracing::instrument(skip(self, posts), fields(count = posts.len()))]
    pub fn save_posts(&self, posts: &[ContentPost]) -> anyhow::Result<()> {
        validate_posts(posts)?;
        save_json_atomic(&self.posts_path, posts)
            .with_context(|| format!("failed to save {}", self.posts_path.display()))
    }
}

fn validate_posts(posts: &[ContentPost]) -> anyhow::Result<()> {
    let mut seen = HashSet::with_capacity(posts.len());
    for post in posts {
        if post.id.trim().is_empty() {
            return Err(anyhow!("post {:?} has an empty id", post.title));
        }
        if !seen.insert(post.id.as_str()) {
            return Err(anyhow!("duplicate post id: {}", post.id));
        }
        if post.platforms.is_empty() {
            return Err(anyhow!("post {} lists no platforms", post.id));
        }
    }
    Ok(())
}

#[tracing::instrument(skip(path, posts))]
fn save_json_atomic(path: &Path, posts: &[ContentPost]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = posts.len(), "saving json atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    let serialized = serde_json::to_string_pretty(posts)?;
    writeln!(temp, "{serialized}")?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::PostStore;
    use crate::post::{ContentPost, ContentType, Platform, PostStatus};

    #[test]
    fn missing_file_loads_as_empty() {
        let temp = tempdir().expect("tempdir");
        let store = PostStore::open(temp.path()).expect("open store");
        assert!(store.load_posts().expect("load").is_empty());
    }

    #[test]
    fn bad_dates_become_undated_instead_of_failing() {
        let temp = tempdir().expect("tempdir");
        let store = PostStore::open(temp.path()).expect("open store");
        fs::write(
            &store.posts_path,
            r#"[{
                "id": "1",
                "title": "Launch teaser",
                "contentType": "video",
                "platforms": ["youtube"],
                "status": "scheduled",
                "scheduledDate": "next tuesday-ish"
            }]"#,
        )
        .expect("write posts");

        let posts = store.load_posts().expect("load");
        assert_eq!(posts.len(), 1);
        assert!(posts[0].effective_date().is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let store = PostStore::open(temp.path()).expect("open store");
        let post = ContentPost::new(
            "dup",
            "one",
            ContentType::Tweet,
            vec![Platform::Twitter],
            PostStatus::Draft,
        );

        let err = store
            .save_posts(&[post.clone(), post])
            .expect_err("duplicate ids");
        assert!(err.to_string().contains("duplicate post id"));
    }

    #[test]
    fn empty_platforms_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let store = PostStore::open(temp.path()).expect("open store");
        let post = ContentPost::new("x", "nowhere", ContentType::Text, vec![], PostStatus::Draft);
        assert!(store.save_posts(&[post]).is_err());
    }
}
