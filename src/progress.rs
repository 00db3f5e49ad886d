use crate::badges::award_new_badges;
use crate::config::RulesConfig;
use crate::notify::{Notification, Notifier};
use crate::types::{Badge, Roadmap, RoadmapProgress, Step, StepTransition, UserProfile};

/// Result of one status change: the whole next-state profile plus what it earned.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub profile: UserProfile,
    pub newly_completed: bool,
    pub xp_awarded: u64,
    pub new_badges: Vec<Badge>,
}

/// Moves `step_id` of `roadmap_id` to `transition`, awarding XP for a first
/// completion and any badges the updated profile now qualifies for.
///
/// The in-progress set holds at most one step per roadmap: starting a step
/// replaces whatever was in progress before.
pub fn apply_step_status(
    profile: &UserProfile,
    roadmap_id: &str,
    step_id: &str,
    transition: StepTransition,
    rules: &RulesConfig,
    notifier: &mut dyn Notifier,
) -> StepOutcome {
    let mut next = profile.clone();
    let mut progress: RoadmapProgress = next.progress_for(roadmap_id);
    let mut newly_completed = false;
    let mut xp_awarded = 0;

    match transition {
        StepTransition::InProgress => {
            progress.completed_steps.remove(step_id);
            progress.in_progress_steps.clear();
            progress.in_progress_steps.insert(step_id.to_string());
        }
        StepTransition::Completed => {
            if progress.completed_steps.insert(step_id.to_string()) {
                newly_completed = true;
                xp_awarded = rules.xp_per_step;
                next.xp = next.xp.saturating_add(xp_awarded);
                notifier.notify(Notification::info(
                    "Step completed!",
                    format!("You earned {xp_awarded} XP!"),
                ));
            }
            progress.in_progress_steps.remove(step_id);
        }
    }

    tracing::debug!(
        roadmap = roadmap_id,
        step = step_id,
        ?transition,
        newly_completed,
        xp = next.xp,
        "step status applied"
    );

    next.progress.insert(roadmap_id.to_string(), progress);
    let new_badges = award_new_badges(&mut next, &rules.badges, notifier);

    StepOutcome {
        profile: next,
        newly_completed,
        xp_awarded,
        new_badges,
    }
}

/// Share of the roadmap's steps that are completed, rounded to a whole percent.
pub fn completion_percent(roadmap: &Roadmap, progress: &RoadmapProgress) -> u8 {
    let total = roadmap.steps.len();
    if total == 0 {
        return 0;
    }
    let done = roadmap
        .steps
        .iter()
        .filter(|step| progress.is_completed(&step.id))
        .count();
    ((done as f64 / total as f64) * 100.0).round() as u8
}

/// First step, in roadmap order, that is not completed.
pub fn next_step<'a>(roadmap: &'a Roadmap, progress: &RoadmapProgress) -> Option<&'a Step> {
    roadmap
        .steps
        .iter()
        .find(|step| !progress.is_completed(&step.id))
}
