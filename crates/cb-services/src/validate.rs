//! Field bounds checked before any write. Violations never leave
//! partial state behind.

use cb_core::error::{AppError, Result};

pub const POST_TITLE_MIN: usize = 3;
pub const POST_TITLE_MAX: usize = 50;
pub const POST_CONTENT_MIN: usize = 3;
pub const POST_CONTENT_MAX: usize = 1000;
pub const COMMENT_CONTENT_MIN: usize = 3;
pub const COMMENT_CONTENT_MAX: usize = 200;
pub const TOPIC_NAME_MIN: usize = 1;
pub const TOPIC_NAME_MAX: usize = 20;
/// A post or comment can embed at most this many images.
pub const MAX_IMAGES: usize = 3;

fn bounded(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min {
        return Err(AppError::Validation(format!(
            "{field} needs to be at least {min} characters"
        )));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(())
}

pub fn post_title(title: &str) -> Result<()> {
    bounded("a post title", title.trim(), POST_TITLE_MIN, POST_TITLE_MAX)
}

pub fn post_content(content: &str) -> Result<()> {
    bounded("a post content", content, POST_CONTENT_MIN, POST_CONTENT_MAX)
}

pub fn comment_content(content: &str) -> Result<()> {
    bounded(
        "a comment content",
        content,
        COMMENT_CONTENT_MIN,
        COMMENT_CONTENT_MAX,
    )
}

pub fn topic_name(name: &str) -> Result<()> {
    bounded("a topic name", name.trim(), TOPIC_NAME_MIN, TOPIC_NAME_MAX)
}

pub fn image_count(count: usize) -> Result<()> {
    if count > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "content can only embed {MAX_IMAGES} images"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_bounds() {
        assert!(post_title("ok!").is_ok());
        assert!(post_title("no").is_err());
        assert!(post_title(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_trimmed_before_measuring() {
        assert!(topic_name("  rust  ").is_ok());
        assert!(topic_name("   ").is_err());
    }

    #[test]
    fn test_image_count_cap() {
        assert!(image_count(3).is_ok());
        assert!(image_count(4).is_err());
    }
}
