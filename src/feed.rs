//! Project listing model and its load lifecycle.
//!
//! The backend serializes [`ProjectRecord`]s out of the projects config
//! file; the frontend deserializes the same shape from `/api/projects` and
//! drives rendering off [`FeedState`].

use serde::{Deserialize, Serialize};

/// Placeholder cards shown while the listing is in flight.
pub const SKELETON_CARD_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    /// Absent in the wire format means no tags, not an error.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Lifecycle of one fetch attempt. Starts at `Loading`, settles exactly
/// once per attempt; a retry starts a fresh attempt back at `Loading`.
#[derive(Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Loaded(Vec<ProjectRecord>),
    Failed(String),
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn records(&self) -> Option<&[ProjectRecord]> {
        match self {
            Self::Loaded(records) => Some(records),
            _ => None,
        }
    }
}

/// Which rendered card the pointer currently rests on. Last-enter-wins:
/// entering a new card replaces the previous index, and a leave event only
/// clears the index it names so a late leave cannot clobber a newer enter.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct HoverState {
    hovered: Option<usize>,
}

impl HoverState {
    pub fn enter(self, index: usize) -> Self {
        Self {
            hovered: Some(index),
        }
    }

    pub fn leave(self, index: usize) -> Self {
        if self.hovered == Some(index) {
            Self { hovered: None }
        } else {
            self
        }
    }

    pub fn is_hovered(self, index: usize) -> bool {
        self.hovered == Some(index)
    }

    pub fn hovered(self) -> Option<usize> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            title: format!("Project {id}"),
            description: "description".to_string(),
            image_url: format!("/previews/{id}.svg"),
            project_url: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn feed_starts_loading_and_settles_loaded_in_source_order() {
        let state = FeedState::Loading;
        assert!(state.is_loading());
        assert_eq!(state.records(), None);

        let state = FeedState::Loaded(vec![record("a"), record("b"), record("c")]);
        let ids: Vec<&str> = state
            .records()
            .expect("loaded state exposes records")
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        assert!(!state.is_loading());
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn failed_state_carries_the_error_message() {
        let state = FeedState::Failed("connection refused".to_string());

        assert!(!state.is_loading());
        assert_eq!(state.records(), None);
        assert!(matches!(state, FeedState::Failed(message) if message == "connection refused"));
    }

    #[test]
    fn record_without_tags_deserializes_to_an_empty_sequence() {
        let json = r#"{
            "id": "shade",
            "title": "Project SHADE",
            "description": "Sequence model dashboard.",
            "imageUrl": "/previews/shade.svg"
        }"#;

        let record: ProjectRecord = serde_json::from_str(json).expect("record parses");

        assert!(record.tags.is_empty());
        assert_eq!(record.project_url, None);
    }

    #[test]
    fn record_round_trips_camel_case_field_names() {
        let record = ProjectRecord {
            project_url: Some("https://example.com/shade".to_string()),
            tags: vec!["rust".to_string(), "wasm".to_string()],
            ..record("shade")
        };

        let json = serde_json::to_string(&record).expect("record serializes");

        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"projectUrl\""));
        assert!(!json.contains("image_url"));
    }

    #[test]
    fn hovering_a_new_card_replaces_the_previous_index() {
        let hover = HoverState::default().enter(2).enter(0);

        assert_eq!(hover.hovered(), Some(0));
        assert!(hover.is_hovered(0));
        assert!(!hover.is_hovered(2));
    }

    #[test]
    fn stale_leave_does_not_clear_a_newer_enter() {
        let hover = HoverState::default().enter(0).enter(2).leave(0);

        assert_eq!(hover.hovered(), Some(2));
    }

    #[test]
    fn matching_leave_clears_the_hover() {
        let hover = HoverState::default().enter(1).leave(1);

        assert_eq!(hover.hovered(), None);
    }
}
