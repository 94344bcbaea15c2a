use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Platform name -> URL. The well-known keys are twitter, github, linkedin,
/// instagram and website, but anything goes.
pub type SocialLinks = BTreeMap<String, String>;

/// A stored file: unique storage path plus the public URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: Uuid,
    pub path: String,
    pub url: String,
}

/// Public identity of an author. Exactly one per principal; a principal
/// without a profile is still onboarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub handle: String,
    pub bio: String,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub avatar: Option<FileRef>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(principal_id: Uuid, handle: String, bio: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal_id,
            handle,
            bio,
            social_links: SocialLinks::new(),
            avatar: None,
            created_at: Utc::now(),
        }
    }
}

/// Handles are restricted to letters, digits, underscores and hyphens.
pub fn validate_handle(handle: &str) -> Result<(), DomainError> {
    if handle.is_empty() {
        return Err(DomainError::Validation("handle must not be empty".into()));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::Validation(
            "handle can only contain letters, numbers, underscores, and hyphens".into(),
        ));
    }
    Ok(())
}

/// Drops entries whose value is blank, trimming the rest.
pub fn clean_social_links(links: SocialLinks) -> SocialLinks {
    links
        .into_iter()
        .filter_map(|(platform, url)| {
            let url = url.trim().to_string();
            if url.is_empty() { None } else { Some((platform, url)) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_word_characters_and_hyphens() {
        for handle in ["alice", "alice_2", "a-b-c", "X", "0day"] {
            assert!(validate_handle(handle).is_ok(), "rejected {handle}");
        }
    }

    #[test]
    fn rejects_spaces_punctuation_and_empty() {
        for handle in ["", "alice smith", "a.b", "émile", "x/y", "@alice"] {
            assert!(validate_handle(handle).is_err(), "accepted {handle:?}");
        }
    }

    #[test]
    fn clean_links_strips_blank_values() {
        let mut links = SocialLinks::new();
        links.insert("github".into(), " alice ".into());
        links.insert("twitter".into(), "   ".into());
        links.insert("website".into(), "".into());

        let cleaned = clean_social_links(links);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["github"], "alice");
    }
}
