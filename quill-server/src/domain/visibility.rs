//! Read/write access predicates for posts.
//!
//! The same rules are enforced by the database-side authorization layer;
//! these mirror it so no screen hands out an affordance the server would
//! reject. A failed view check must surface as "not found", never as
//! "forbidden", so drafts do not leak their existence.

use uuid::Uuid;

use crate::domain::post::Post;

/// A post is readable when it is published or the viewer is its author.
pub fn can_view(post: &Post, viewer_profile_id: Option<Uuid>) -> bool {
    post.published || viewer_profile_id == Some(post.author_id)
}

/// Only the author can update or delete a post.
pub fn can_mutate(post: &Post, viewer_profile_id: Option<Uuid>) -> bool {
    viewer_profile_id == Some(post.author_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author_id: Uuid, published: bool) -> Post {
        Post::new(author_id, "t".into(), "c".into(), published)
    }

    #[test]
    fn view_matches_published_or_author_for_every_combination() {
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        for published in [false, true] {
            let p = post(author, published);
            for viewer in [None, Some(stranger), Some(author)] {
                let expected = published || viewer == Some(author);
                assert_eq!(can_view(&p, viewer), expected, "published={published} viewer={viewer:?}");
            }
        }
    }

    #[test]
    fn only_the_author_can_mutate() {
        let author = Uuid::new_v4();
        for published in [false, true] {
            let p = post(author, published);
            assert!(can_mutate(&p, Some(author)));
            assert!(!can_mutate(&p, Some(Uuid::new_v4())));
            assert!(!can_mutate(&p, None));
        }
    }
}
