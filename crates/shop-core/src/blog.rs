//! Blog posts shown on the storefront.

use crate::error::{ShopError, ShopResult};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: String,
    pub blog_image: String,
    pub blog_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_description: Option<String>,
    pub author_image: String,
    pub author_name: String,
    pub author_title: String,
    pub blog_likes: u64,
    pub blog_views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which counter to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogCounter {
    Views,
    Likes,
}

impl Blog {
    pub fn increment(&mut self, counter: BlogCounter) -> u64 {
        let value = match counter {
            BlogCounter::Views => &mut self.blog_views,
            BlogCounter::Likes => &mut self.blog_likes,
        };
        *value += 1;
        *value
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    #[serde(default)]
    pub blog_image: String,
    #[serde(default)]
    pub blog_title: String,
    #[serde(default)]
    pub blog_description: Option<String>,
    #[serde(default)]
    pub author_image: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_title: String,
}

impl NewBlog {
    pub fn validate(self) -> ShopResult<Blog> {
        let blog_image = validate::image_url("blog image URL", &self.blog_image)?;
        let author_image = validate::image_url("author image URL", &self.author_image)?;
        let blog_title = validate::length("Blog title", &self.blog_title, 5, 255)?;
        let blog_description = match self.blog_description.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(d) if d.chars().count() < 5 => {
                return Err(ShopError::validation(
                    "Blog description must be at least 5 characters if provided.",
                ))
            }
            Some(d) => Some(d.to_string()),
        };
        let author_name = validate::length("Author name", &self.author_name, 2, 50)?;
        let author_title = validate::length("Author title", &self.author_title, 5, 50)?;

        let now = Utc::now();
        Ok(Blog {
            id: Uuid::new_v4().to_string(),
            blog_image,
            blog_title,
            blog_description,
            author_image,
            author_name,
            author_title,
            blog_likes: 0,
            blog_views: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_blog() -> NewBlog {
        NewBlog {
            blog_image: "https://res.cloudinary.com/byc/blog.png".into(),
            blog_title: "Summer essentials".into(),
            blog_description: Some("What to wear this season".into()),
            author_image: "https://res.cloudinary.com/byc/author.png".into(),
            author_name: "Ada".into(),
            author_title: "Style Editor".into(),
        }
    }

    #[test]
    fn test_validate() {
        let blog = new_blog().validate().unwrap();
        assert_eq!(blog.blog_views, 0);

        let mut input = new_blog();
        input.blog_image = "https://imgur.com/x.png".into();
        assert!(input.validate().is_err());

        let mut input = new_blog();
        input.blog_description = Some("abc".into());
        assert!(input.validate().is_err());

        let mut input = new_blog();
        input.blog_description = Some("   ".into());
        assert!(input.validate().unwrap().blog_description.is_none());
    }

    #[test]
    fn test_counters() {
        let mut blog = new_blog().validate().unwrap();
        assert_eq!(blog.increment(BlogCounter::Views), 1);
        assert_eq!(blog.increment(BlogCounter::Views), 2);
        assert_eq!(blog.increment(BlogCounter::Likes), 1);
    }
}
