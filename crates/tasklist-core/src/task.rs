use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::compact_date_serde;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Personal, Category::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTime {
    #[serde(with = "compact_date_serde")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "compact_date_serde")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, with = "compact_date_serde::option")]
    pub done_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub time: TaskTime,
}

impl Task {
    pub(crate) fn new_open(
        category: Category,
        title: String,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            title,
            description,
            done: false,
            time: TaskTime {
                created_at: now,
                updated_at: now,
                done_at: None,
            },
        }
    }

    pub fn short_id(&self) -> String {
        short_id(self.id)
    }
}

/// First block of the hyphenated UUID, used for display and prefix lookup.
pub fn short_id(id: Uuid) -> String {
    let text = id.to_string();
    text.split('-').next().unwrap_or(&text).to_string()
}

/// Candidate field values as a form would hand them over, not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Draft {
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            category: task.category.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }
}
