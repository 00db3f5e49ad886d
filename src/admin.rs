use thiserror::Error;
use ulid::Ulid;

use crate::catalog::validate_roadmaps;
use crate::storage::{SessionStorage, StorageError};
use crate::types::{Resource, ResourceType, Roadmap, Step, UserProfile};
use crate::validator;

/// Session storage key holding the admin-curated roadmap list.
pub const ADMIN_ROADMAPS_KEY: &str = "adminRoadmaps";

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("You must be an administrator to access this page.")]
    AccessDenied,
    #[error("Please select a roadmap and step.")]
    NoSelection,
    #[error("Roadmap not found: {0}")]
    UnknownRoadmap(String),
    #[error("Step not found: {0}")]
    UnknownStep(String),
    #[error("Resource not found: {0}")]
    UnknownResource(String),
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl AdminError {
    pub fn title(&self) -> &'static str {
        match self {
            AdminError::AccessDenied => "Access Denied",
            AdminError::NoSelection => "Selection required",
            AdminError::Validation(_) => "Missing information",
            AdminError::Storage(_) => "Could not save",
            _ => "Not found",
        }
    }
}

/// Form data for a new or edited resource.
#[derive(Clone, Debug)]
pub struct ResourceDraft {
    pub title: String,
    pub description: String,
    pub kind: ResourceType,
    pub url: String,
}

impl Default for ResourceDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            kind: ResourceType::Video,
            url: String::new(),
        }
    }
}

impl ResourceDraft {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            description: resource.description.clone().unwrap_or_default(),
            kind: resource.kind,
            url: resource.url.clone(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = validator::required("Title", &self.title);
        errors.extend(validator::url(&self.url));
        errors
    }

    fn into_resource(self, id: String) -> Resource {
        let description = self.description.trim();
        Resource {
            id,
            title: self.title.trim().to_string(),
            kind: self.kind,
            url: self.url.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        }
    }
}

pub fn require_admin(profile: Option<&UserProfile>) -> Result<&UserProfile, AdminError> {
    match profile {
        Some(p) if p.is_admin() => Ok(p),
        _ => Err(AdminError::AccessDenied),
    }
}

/// The curated roadmap list stored in the session, or `fallback` when nothing
/// usable is stored.
pub fn load_curated(storage: &impl SessionStorage, fallback: &[Roadmap]) -> Vec<Roadmap> {
    let Some(raw) = storage.get_item(ADMIN_ROADMAPS_KEY) else {
        return fallback.to_vec();
    };
    match serde_json::from_str::<Vec<Roadmap>>(&raw) {
        Ok(roadmaps) => {
            let errors = validate_roadmaps(&roadmaps);
            if errors.is_empty() {
                roadmaps
            } else {
                tracing::warn!(?errors, "stored roadmaps failed validation, using catalog");
                fallback.to_vec()
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse roadmaps from session storage");
            fallback.to_vec()
        }
    }
}

pub fn save_curated(storage: &mut impl SessionStorage, roadmaps: &[Roadmap]) -> Result<(), AdminError> {
    let serialized = serde_json::to_string(roadmaps).map_err(StorageError::from)?;
    storage.set_item(ADMIN_ROADMAPS_KEY, serialized)?;
    Ok(())
}

fn step_mut<'a>(
    roadmaps: &'a mut [Roadmap],
    roadmap_id: &str,
    step_id: &str,
) -> Result<&'a mut Step, AdminError> {
    if roadmap_id.trim().is_empty() || step_id.trim().is_empty() {
        return Err(AdminError::NoSelection);
    }
    let roadmap = roadmaps
        .iter_mut()
        .find(|r| r.id == roadmap_id)
        .ok_or_else(|| AdminError::UnknownRoadmap(roadmap_id.to_string()))?;
    roadmap
        .steps
        .iter_mut()
        .find(|s| s.id == step_id)
        .ok_or_else(|| AdminError::UnknownStep(step_id.to_string()))
}

pub fn add_resource(
    roadmaps: &mut [Roadmap],
    roadmap_id: &str,
    step_id: &str,
    draft: ResourceDraft,
) -> Result<Resource, AdminError> {
    let step = step_mut(roadmaps, roadmap_id, step_id)?;
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(AdminError::Validation(errors));
    }
    let resource = draft.into_resource(format!(
        "resource-{}",
        Ulid::new().to_string().to_ascii_lowercase()
    ));
    step.resources.push(resource.clone());
    tracing::info!(roadmap = roadmap_id, step = step_id, resource = %resource.id, "resource added");
    Ok(resource)
}

pub fn update_resource(
    roadmaps: &mut [Roadmap],
    roadmap_id: &str,
    step_id: &str,
    resource_id: &str,
    draft: ResourceDraft,
) -> Result<Resource, AdminError> {
    let step = step_mut(roadmaps, roadmap_id, step_id)?;
    let slot = step
        .resources
        .iter_mut()
        .find(|r| r.id == resource_id)
        .ok_or_else(|| AdminError::UnknownResource(resource_id.to_string()))?;
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(AdminError::Validation(errors));
    }
    *slot = draft.into_resource(resource_id.to_string());
    tracing::info!(roadmap = roadmap_id, step = step_id, resource = resource_id, "resource updated");
    Ok(slot.clone())
}

pub fn delete_resource(
    roadmaps: &mut [Roadmap],
    roadmap_id: &str,
    step_id: &str,
    resource_id: &str,
) -> Result<Resource, AdminError> {
    let step = step_mut(roadmaps, roadmap_id, step_id)?;
    let index = step
        .resources
        .iter()
        .position(|r| r.id == resource_id)
        .ok_or_else(|| AdminError::UnknownResource(resource_id.to_string()))?;
    let removed = step.resources.remove(index);
    tracing::info!(roadmap = roadmap_id, step = step_id, resource = resource_id, "resource deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;
    use crate::types::Role;

    fn roadmaps() -> Vec<Roadmap> {
        Catalog::embedded().unwrap().roadmaps
    }

    fn draft(title: &str, url: &str) -> ResourceDraft {
        ResourceDraft {
            title: title.into(),
            description: String::new(),
            kind: ResourceType::Quiz,
            url: url.into(),
        }
    }

    #[test]
    fn only_admins_pass() {
        let learner = UserProfile::new("u", "U", "u@example.com", Role::Learner);
        let admin = UserProfile::new("a", "A", "a@example.com", Role::Admin);
        assert!(matches!(require_admin(None), Err(AdminError::AccessDenied)));
        assert!(matches!(require_admin(Some(&learner)), Err(AdminError::AccessDenied)));
        assert!(require_admin(Some(&admin)).is_ok());
    }

    #[test]
    fn add_edit_delete_resource() {
        let mut list = roadmaps();
        let added = add_resource(&mut list, "1", "101", draft("HTML Quiz", "https://example.com/quiz")).unwrap();
        assert!(added.description.is_none());
        assert_eq!(list[0].steps[0].resources.len(), 3);

        let mut edit = ResourceDraft::from_resource(&added);
        edit.description = "Ten questions".into();
        let updated = update_resource(&mut list, "1", "101", &added.id, edit).unwrap();
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.description.as_deref(), Some("Ten questions"));

        delete_resource(&mut list, "1", "101", &added.id).unwrap();
        assert_eq!(list[0].steps[0].resources.len(), 2);
        assert!(matches!(
            delete_resource(&mut list, "1", "101", &added.id),
            Err(AdminError::UnknownResource(_))
        ));
    }

    #[test]
    fn invalid_draft_leaves_roadmaps_unchanged() {
        let mut list = roadmaps();
        let before = list.clone();
        assert!(matches!(
            add_resource(&mut list, "1", "101", draft("", "")),
            Err(AdminError::Validation(errors)) if errors.len() == 2
        ));
        assert!(matches!(
            add_resource(&mut list, "", "101", draft("T", "https://example.com")),
            Err(AdminError::NoSelection)
        ));
        assert_eq!(list, before);
    }

    #[test]
    fn curated_list_round_trips_through_storage() {
        let fallback = roadmaps();
        let mut storage = MemoryStorage::new();
        assert_eq!(load_curated(&storage, &fallback), fallback);

        let mut list = fallback.clone();
        delete_resource(&mut list, "2", "201", "2001").unwrap();
        save_curated(&mut storage, &list).unwrap();
        assert_eq!(load_curated(&storage, &fallback), list);

        storage.set_item(ADMIN_ROADMAPS_KEY, "[oops".into()).unwrap();
        assert_eq!(load_curated(&storage, &fallback), fallback);
    }
}
