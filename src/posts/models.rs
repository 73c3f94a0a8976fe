//! Post Models
//! Mission: Feed posts with likes and comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// Why a comment could not be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRemoval {
    NotFound,
    NotAuthor,
}

impl Post {
    pub fn new(user: &str, text: &str, name: &str, avatar: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            text: text.to_string(),
            name: name.to_string(),
            avatar: avatar.to_string(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|l| l.user == user_id)
    }

    /// Like if not yet liked, otherwise unlike. Returns whether the post is
    /// now liked by `user_id`.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|l| l.user != user_id);
            false
        } else {
            self.likes.insert(
                0,
                Like {
                    user: user_id.to_string(),
                },
            );
            true
        }
    }

    /// Newest comment first
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Only the comment's author may remove it
    pub fn remove_comment(&mut self, comment_id: &str, user_id: &str) -> Result<(), CommentRemoval> {
        let idx = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(CommentRemoval::NotFound)?;

        if self.comments[idx].user != user_id {
            return Err(CommentRemoval::NotAuthor);
        }

        self.comments.remove(idx);
        Ok(())
    }
}

impl Comment {
    pub fn new(user: &str, text: &str, name: &str, avatar: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            text: text.to_string(),
            name: name.to_string(),
            avatar: avatar.to_string(),
            date: Utc::now(),
        }
    }
}

/// Body for new posts and comments
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}
