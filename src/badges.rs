use crate::notify::{Notification, Notifier};
use crate::types::{Badge, BadgeCriteria, UserProfile};

pub fn default_badges() -> Vec<Badge> {
    vec![
        Badge {
            id: "first-step".to_string(),
            name: "First Step".to_string(),
            description: "Completed your first learning step".to_string(),
            image: "🚀".to_string(),
            criteria: BadgeCriteria::CompletedSteps { value: 1 },
        },
        Badge {
            id: "knowledge-seeker".to_string(),
            name: "Knowledge Seeker".to_string(),
            description: "Reached 100 XP".to_string(),
            image: "📚".to_string(),
            criteria: BadgeCriteria::Xp { value: 100 },
        },
        Badge {
            id: "dedicated-learner".to_string(),
            name: "Dedicated Learner".to_string(),
            description: "Completed 5 learning steps".to_string(),
            image: "🎓".to_string(),
            criteria: BadgeCriteria::CompletedSteps { value: 5 },
        },
        Badge {
            id: "master-student".to_string(),
            name: "Master Student".to_string(),
            description: "Reached 500 XP".to_string(),
            image: "🏆".to_string(),
            criteria: BadgeCriteria::Xp { value: 500 },
        },
    ]
}

pub fn criteria_met(criteria: &BadgeCriteria, profile: &UserProfile) -> bool {
    match criteria {
        BadgeCriteria::Xp { value } => profile.xp >= *value,
        BadgeCriteria::CompletedSteps { value } => profile.total_completed_steps() >= *value,
        BadgeCriteria::RoadmapCompleted { roadmap_id, value } => {
            profile
                .progress
                .get(roadmap_id)
                .map_or(0, |p| p.completed_steps.len())
                >= *value
        }
    }
}

pub fn describe_criteria(criteria: &BadgeCriteria) -> String {
    match criteria {
        BadgeCriteria::Xp { value } => format!("reach {value} XP"),
        BadgeCriteria::CompletedSteps { value } if *value == 1 => "complete 1 step".to_string(),
        BadgeCriteria::CompletedSteps { value } => format!("complete {value} steps"),
        BadgeCriteria::RoadmapCompleted { roadmap_id, value } => {
            format!("complete {value} steps of roadmap {roadmap_id}")
        }
    }
}

/// Badges from `catalog` whose criteria `profile` meets and which it does not
/// hold yet, in catalog order.
pub fn evaluate<'a>(profile: &UserProfile, catalog: &'a [Badge]) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| !profile.badges.contains(&badge.id))
        .filter(|badge| criteria_met(&badge.criteria, profile))
        .collect()
}

/// Runs [`evaluate`], merges the result into `profile.badges` and emits one
/// notification per new badge.
pub fn award_new_badges(
    profile: &mut UserProfile,
    catalog: &[Badge],
    notifier: &mut dyn Notifier,
) -> Vec<Badge> {
    let earned: Vec<Badge> = evaluate(profile, catalog).into_iter().cloned().collect();
    for badge in &earned {
        tracing::debug!(badge = %badge.id, user = %profile.id, "badge earned");
        profile.badges.insert(badge.id.clone());
        notifier.notify(Notification::info(
            format!("New Badge: {}", badge.name),
            badge.description.clone(),
        ));
    }
    earned
}

/// Catalog badges the profile holds, in catalog order. Held ids unknown to the
/// catalog are skipped.
pub fn earned_badges<'a>(profile: &UserProfile, catalog: &'a [Badge]) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| profile.badges.contains(&badge.id))
        .collect()
}
