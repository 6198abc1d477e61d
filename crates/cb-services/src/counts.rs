//! # Counter Recalculator
//!
//! Post-fetch hydration of the derived `num_likes` / `num_comments`
//! fields. Counts are always recomputed from join records and child
//! documents, never incremented in place: a stored counter can drift
//! after a partially failed toggle or cascade, a derived one heals
//! itself on the next read.

use cb_core::error::Result;
use cb_core::models::{Comment, Post, SaveKind};
use cb_core::traits::{ContentRepo, EngagementRepo};

/// Fills in a fetched post's derived counters.
pub async fn hydrate_post(
    content: &dyn ContentRepo,
    engagement: &dyn EngagementRepo,
    post: &mut Post,
) -> Result<()> {
    post.num_likes = engagement.count_saved(post.id, SaveKind::Like).await?;
    post.num_comments = content.count_comments_by_post(post.id).await?;
    Ok(())
}

/// Batch variant: one count pair per fetched post.
pub async fn hydrate_posts(
    content: &dyn ContentRepo,
    engagement: &dyn EngagementRepo,
    posts: &mut [Post],
) -> Result<()> {
    for post in posts.iter_mut() {
        hydrate_post(content, engagement, post).await?;
    }
    Ok(())
}

/// Fills in a fetched comment's derived like counter.
pub async fn hydrate_comment(engagement: &dyn EngagementRepo, comment: &mut Comment) -> Result<()> {
    comment.num_likes = engagement.count_comment_likes(comment.id).await?;
    Ok(())
}

pub async fn hydrate_comments(
    engagement: &dyn EngagementRepo,
    comments: &mut [Comment],
) -> Result<()> {
    for comment in comments.iter_mut() {
        hydrate_comment(engagement, comment).await?;
    }
    Ok(())
}
