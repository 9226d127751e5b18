//! Content Store — the authored résumé chapters.
//!
//! Chapters are compiled into the binary, sorted once at startup and never
//! mutated afterwards, so the store is shared as a plain `Arc` with no locking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub mod chapters;
pub mod handlers;

/// First name of the person the résumé describes. Used in agent copy.
pub const PROFILE_NAME: &str = "Brendan";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub url: String,
    pub description: String,
    /// e.g. "Hackathon", "In Development", "Live"
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub order: i32,
    pub title: String,
    pub subtitle: String,
    pub date_range: String,
    pub bullet_points: Vec<String>,
    /// Pre-written prompt for the agent's image generation tool.
    pub image_prompt: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

/// Immutable, display-ordered chapter list.
#[derive(Debug, Clone)]
pub struct ContentStore {
    chapters: Vec<Chapter>,
}

impl ContentStore {
    /// Builds a store from arbitrary chapters. Sorting by `order` is stable,
    /// so chapters sharing an order keep their authored position.
    pub fn new(mut chapters: Vec<Chapter>) -> Self {
        chapters.sort_by_key(|ch| ch.order);
        Self { chapters }
    }

    /// The store backing the live site.
    pub fn authored() -> Self {
        Self::new(chapters::authored_chapters())
    }

    /// All chapters in display order.
    pub fn sorted(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn get(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|ch| ch.id == id)
    }

    /// Every tag used by any chapter, de-duplicated and sorted.
    pub fn all_tags(&self) -> Vec<String> {
        self.chapters
            .iter()
            .flat_map(|ch| ch.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Plain-text digest of the whole timeline, used to brief the agent.
    pub fn resume_text(&self) -> String {
        self.chapters
            .iter()
            .map(|ch| {
                let bullets = ch
                    .bullet_points
                    .iter()
                    .map(|bp| format!("- {bp}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "## {} ({})\n{}\n{}\nSkills: {}",
                    ch.title,
                    ch.date_range,
                    ch.subtitle,
                    bullets,
                    ch.tags.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
