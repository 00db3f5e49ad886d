use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Learner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "learner" => Ok(Role::Learner),
            "admin" | "administrator" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Blog,
    Quiz,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [ResourceType::Video, ResourceType::Blog, ResourceType::Quiz];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Video => "video",
            ResourceType::Blog => "blog",
            ResourceType::Quiz => "quiz",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ResourceType::Video => "▶",
            ResourceType::Blog => "📄",
            ResourceType::Quiz => "?",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(ResourceType::Video),
            "blog" => Ok(ResourceType::Blog),
            "quiz" => Ok(ResourceType::Quiz),
            _ => Err(format!("Unknown resource type: {s}")),
        }
    }
}

/// Derived display state of a single step for one learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "Not Started",
            StepStatus::InProgress => "In Progress",
            StepStatus::Completed => "Completed",
        }
    }
}

/// Status a learner may move a step to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StepTransition {
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapProgress {
    #[serde(default)]
    pub completed_steps: BTreeSet<String>,
    #[serde(default)]
    pub in_progress_steps: BTreeSet<String>,
}

impl RoadmapProgress {
    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }

    pub fn status_of(&self, step_id: &str) -> StepStatus {
        if self.completed_steps.contains(step_id) {
            StepStatus::Completed
        } else if self.in_progress_steps.contains(step_id) {
            StepStatus::InProgress
        } else {
            StepStatus::NotStarted
        }
    }

    /// Drops in-progress ids that are also completed. Returns how many were dropped.
    pub fn normalize(&mut self) -> usize {
        let before = self.in_progress_steps.len();
        let completed = &self.completed_steps;
        self.in_progress_steps.retain(|id| !completed.contains(id));
        before - self.in_progress_steps.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_goal: Option<String>,
    #[serde(default)]
    pub weekly_time: u32,
    #[serde(default)]
    pub progress: BTreeMap<String, RoadmapProgress>,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

impl UserProfile {
    /// A zero-valued profile, as created at signup.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            interests: Vec::new(),
            learning_goal: None,
            weekly_time: 0,
            progress: BTreeMap::new(),
            xp: 0,
            badges: BTreeSet::new(),
            joined_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Progress for one roadmap; an absent entry reads as empty.
    pub fn progress_for(&self, roadmap_id: &str) -> RoadmapProgress {
        self.progress.get(roadmap_id).cloned().unwrap_or_default()
    }

    pub fn total_completed_steps(&self) -> usize {
        self.progress.values().map(|p| p.completed_steps.len()).sum()
    }

    pub fn has_setup(&self) -> bool {
        !self.interests.is_empty() && self.learning_goal.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub steps: Vec<Step>,
}

impl Roadmap {
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BadgeCriteria {
    Xp {
        value: u64,
    },
    CompletedSteps {
        value: usize,
    },
    RoadmapCompleted {
        #[serde(rename = "roadmapId")]
        roadmap_id: String,
        value: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub criteria: BadgeCriteria,
}

/// Catalog login record. The password never leaves the catalog.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct DemoUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub password: String,
}

impl DemoUser {
    pub fn into_profile(self) -> UserProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_round_trips_with_camel_case_keys() {
        let json = r#"{"completedSteps":["101"],"inProgressSteps":["102"]}"#;
        let progress: RoadmapProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.status_of("101"), StepStatus::Completed);
        assert_eq!(progress.status_of("102"), StepStatus::InProgress);
        assert_eq!(progress.status_of("103"), StepStatus::NotStarted);
        assert_eq!(serde_json::to_string(&progress).unwrap(), json);
    }

    #[test]
    fn normalize_drops_overlapping_in_progress_ids() {
        let mut progress = RoadmapProgress::default();
        progress.completed_steps.insert("a".into());
        progress.in_progress_steps.insert("a".into());
        progress.in_progress_steps.insert("b".into());
        assert_eq!(progress.normalize(), 1);
        assert!(!progress.in_progress_steps.contains("a"));
        assert!(progress.in_progress_steps.contains("b"));
    }

    #[test]
    fn badge_criteria_uses_tagged_layout() {
        let json = r#"{"type":"roadmapCompleted","roadmapId":"1","value":2}"#;
        let criteria: BadgeCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(
            criteria,
            BadgeCriteria::RoadmapCompleted {
                roadmap_id: "1".into(),
                value: 2
            }
        );
    }

    #[test]
    fn sparse_profile_defaults_missing_fields() {
        let json = r#"{"id":"u","name":"U","email":"u@example.com"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Learner);
        assert_eq!(profile.xp, 0);
        assert!(profile.badges.is_empty());
        assert_eq!(profile.total_completed_steps(), 0);
    }

    #[test]
    fn role_and_resource_type_parse_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("QUIZ".parse::<ResourceType>().unwrap(), ResourceType::Quiz);
        assert!("podcast".parse::<ResourceType>().is_err());
    }
}
