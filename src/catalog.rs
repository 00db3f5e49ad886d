use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{DemoUser, Roadmap};
use crate::validator;

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid catalog: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Static learning content plus the demo accounts used for login lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub roadmaps: Vec<Roadmap>,
    #[serde(default)]
    pub users: Vec<DemoUser>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_str(json)?;
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(CatalogError::Invalid(errors));
        }
        for user in &mut catalog.users {
            let dropped = user
                .profile
                .progress
                .values_mut()
                .map(|p| p.normalize())
                .sum::<usize>();
            if dropped > 0 {
                tracing::warn!(user = %user.profile.id, dropped, "demo user had steps both completed and in progress");
            }
        }
        Ok(catalog)
    }

    /// Returns every problem found; empty means the catalog is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = validate_roadmaps(&self.roadmaps);

        let mut user_ids = HashSet::new();
        let mut emails = HashSet::new();
        for user in &self.users {
            let profile = &user.profile;
            errors.extend(validator::required("User id", &profile.id));
            errors.extend(validator::required("User name", &profile.name));
            errors.extend(validator::email(&profile.email));
            errors.extend(validator::required("Password", &user.password));
            if !user_ids.insert(profile.id.as_str()) {
                errors.push(format!("Duplicate user id \"{}\".", profile.id));
            }
            if !emails.insert(profile.email.to_ascii_lowercase()) {
                errors.push(format!("Duplicate user email \"{}\".", profile.email));
            }
        }
        errors
    }

    pub fn roadmap(&self, id: &str) -> Option<&Roadmap> {
        self.roadmaps.iter().find(|r| r.id == id)
    }

    /// Email match ignores case; password match is exact.
    pub fn find_user(&self, email: &str, password: &str) -> Option<&DemoUser> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.profile.email.eq_ignore_ascii_case(email) && u.password == password)
    }

    /// Same catalog with the roadmap list replaced, e.g. by an admin-curated copy.
    pub fn with_roadmaps(&self, roadmaps: Vec<Roadmap>) -> Self {
        Self {
            roadmaps,
            users: self.users.clone(),
        }
    }
}

pub fn validate_roadmaps(roadmaps: &[Roadmap]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut roadmap_ids = HashSet::new();
    for roadmap in roadmaps {
        errors.extend(validator::required("Roadmap id", &roadmap.id));
        errors.extend(validator::required("Roadmap title", &roadmap.title));
        if !roadmap_ids.insert(roadmap.id.as_str()) {
            errors.push(format!("Duplicate roadmap id \"{}\".", roadmap.id));
        }

        let mut step_ids = HashSet::new();
        for step in &roadmap.steps {
            errors.extend(validator::required("Step id", &step.id));
            if !step_ids.insert(step.id.as_str()) {
                errors.push(format!(
                    "Duplicate step id \"{}\" in roadmap \"{}\".",
                    step.id, roadmap.id
                ));
            }

            let mut resource_ids = HashSet::new();
            for resource in &step.resources {
                errors.extend(validator::required("Resource title", &resource.title));
                errors.extend(validator::url(&resource.url));
                if !resource_ids.insert(resource.id.as_str()) {
                    errors.push(format!(
                        "Duplicate resource id \"{}\" in step \"{}\".",
                        resource.id, step.id
                    ));
                }
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceType, Role};

    #[test]
    fn embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.roadmaps.len(), 2);
        assert_eq!(catalog.users.len(), 2);
        let frontend = catalog.roadmap("1").unwrap();
        assert_eq!(frontend.steps[0].resources[0].kind, ResourceType::Video);
        assert_eq!(frontend.step_index("102"), Some(1));
        assert!(catalog.roadmap("99").is_none());
    }

    #[test]
    fn demo_learner_keeps_progress_and_normalizes() {
        let catalog = Catalog::embedded().unwrap();
        let john = catalog.find_user("john@example.com", "password123").unwrap();
        assert_eq!(john.profile.role, Role::Learner);
        assert_eq!(john.profile.xp, 250);
        assert_eq!(john.profile.weekly_time, 10);
        assert!(john.profile.progress_for("1").is_completed("101"));
    }

    #[test]
    fn find_user_ignores_email_case_only() {
        let catalog = Catalog::embedded().unwrap();
        assert!(catalog.find_user("ADMIN@PathPulse.com", "admin123").is_some());
        assert!(catalog.find_user("admin@pathpulse.com", "ADMIN123").is_none());
        assert!(catalog.find_user("nobody@example.com", "admin123").is_none());
    }

    #[test]
    fn unknown_resource_type_is_rejected_at_parse() {
        let json = r#"{"roadmaps":[{"id":"1","title":"T","description":"","steps":[
            {"id":"s","title":"S","description":"","resources":[
                {"id":"r","title":"R","type":"podcast","url":"https://example.com"}]}]}]}"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn duplicate_ids_and_bad_urls_are_reported() {
        let json = r#"{"roadmaps":[
            {"id":"1","title":"T","description":"","steps":[
                {"id":"s","title":"S","description":"","resources":[
                    {"id":"r","title":"R","type":"blog","url":"nope"}]},
                {"id":"s","title":"S2","description":"","resources":[]}]},
            {"id":"1","title":"T2","description":"","steps":[]}]}"#;
        match Catalog::from_json(json) {
            Err(CatalogError::Invalid(errors)) => {
                assert_eq!(errors.len(), 3, "{errors:?}");
            }
            other => panic!("expected invalid catalog, got {other:?}"),
        }
    }
}
