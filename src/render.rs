//! Plain-text views of the pages, colored for a terminal.

use colored::Colorize;

use crate::app::{DashboardView, RoadmapView, StepView};
use crate::auth::interest_label;
use crate::badges::describe_criteria;
use crate::metadata::{PKG_DESCRIPTION, PKG_NAME};
use crate::types::{Badge, Roadmap, StepStatus, UserProfile};

const BAR_WIDTH: usize = 20;

pub const LOCK_OVERLAY: &str = "🔒 Complete the previous step to unlock";

pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled).dimmed()
    )
}

fn status_tag(status: StepStatus) -> String {
    match status {
        StepStatus::Completed => status.label().green().to_string(),
        StepStatus::InProgress => status.label().yellow().to_string(),
        StepStatus::NotStarted => status.label().dimmed().to_string(),
    }
}

pub fn landing() -> String {
    format!(
        "{}\n{}\n\n  login | signup | admin-login\n",
        PKG_NAME.bold(),
        PKG_DESCRIPTION
    )
}

pub fn not_found(path: &str) -> String {
    format!("{} {}\n", "404".red().bold(), format!("No page at {path}").dimmed())
}

pub fn profile(profile: &UserProfile) -> String {
    let mut out = format!(
        "{} <{}> ({})\n",
        profile.name.bold(),
        profile.email,
        profile.role
    );
    out.push_str(&format!("  XP: {}\n", profile.xp.to_string().cyan()));
    out.push_str(&format!(
        "  Completed steps: {}\n",
        profile.total_completed_steps()
    ));
    if !profile.interests.is_empty() {
        let labels: Vec<&str> = profile.interests.iter().map(|i| interest_label(i)).collect();
        out.push_str(&format!("  Interests: {}\n", labels.join(", ")));
    }
    if let Some(goal) = &profile.learning_goal {
        out.push_str(&format!("  Goal: {goal}\n"));
    }
    if profile.weekly_time > 0 {
        out.push_str(&format!("  Weekly time: {} h\n", profile.weekly_time));
    }
    if let Some(joined) = &profile.joined_at {
        out.push_str(&format!("  Joined: {joined}\n"));
    }
    out
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = format!(
        "{} {}\n",
        "Welcome,".bold(),
        view.profile.name.bold()
    );
    out.push_str(&format!(
        "XP {}  |  Steps completed {}  |  Badges {}\n\n",
        view.profile.xp.to_string().cyan(),
        view.profile.total_completed_steps(),
        view.badges.len()
    ));
    for summary in &view.roadmaps {
        out.push_str(&format!(
            "{} {}\n  {}\n  {} ({}/{})\n",
            format!("[{}]", summary.id).dimmed(),
            summary.title.bold(),
            summary.description,
            progress_bar(summary.percent),
            summary.completed,
            summary.total
        ));
        match &summary.next_step {
            Some(next) => out.push_str(&format!("  Next: {next}\n")),
            None => out.push_str(&format!("  {}\n", "All steps completed".green())),
        }
    }
    if !view.badges.is_empty() {
        out.push_str(&format!("\n{}\n", "Badges".bold()));
        for badge in &view.badges {
            out.push_str(&format!("  {} {}\n", badge.image, badge.name));
        }
    }
    out
}

pub fn roadmap_list(roadmaps: &[Roadmap]) -> String {
    roadmaps
        .iter()
        .map(|r| {
            format!(
                "{} {} ({} steps)\n  {}\n",
                format!("[{}]", r.id).dimmed(),
                r.title.bold(),
                r.steps.len(),
                r.description
            )
        })
        .collect()
}

fn step_block(roadmap_id: &str, index: usize, view: &StepView) -> String {
    let step = &view.step;
    let mut out = format!(
        "{}. {} {} {}\n",
        index + 1,
        step.title.bold(),
        format!("({})", step.id).dimmed(),
        status_tag(view.status)
    );
    out.push_str(&format!("   {}\n", step.description));
    for resource in &step.resources {
        let url = if view.locked {
            resource.url.dimmed()
        } else {
            resource.url.underline()
        };
        out.push_str(&format!("   {} {} {url}\n", resource.kind.glyph(), resource.title));
    }
    if view.locked {
        // No status actions until the step unlocks.
        out.push_str(&format!("   {}\n", LOCK_OVERLAY.red()));
        return out;
    }
    let actions = match view.status {
        StepStatus::NotStarted => vec!["start", "complete"],
        StepStatus::InProgress => vec!["complete"],
        StepStatus::Completed => vec!["start"],
    };
    let hints: Vec<String> = actions
        .iter()
        .map(|action| format!("{action} {roadmap_id} {}", step.id))
        .collect();
    out.push_str(&format!("   {} {}\n", "→".cyan(), hints.join("  |  ")));
    out
}

pub fn roadmap(view: &RoadmapView) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n\n",
        view.roadmap.title.bold(),
        view.roadmap.description,
        progress_bar(view.percent)
    );
    for (index, step) in view.steps.iter().enumerate() {
        out.push_str(&step_block(&view.roadmap.id, index, step));
        out.push('\n');
    }
    out
}

pub fn badge_catalog(catalog: &[Badge], profile: Option<&UserProfile>) -> String {
    catalog
        .iter()
        .map(|badge| {
            let earned = profile.is_some_and(|p| p.badges.contains(&badge.id));
            let mark = if earned { "✔".green() } else { "·".dimmed() };
            format!(
                "{mark} {} {} - {} ({})\n",
                badge.image,
                badge.name.bold(),
                badge.description,
                describe_criteria(&badge.criteria)
            )
        })
        .collect()
}

/// Admin listing with every id needed to edit a resource.
pub fn admin_overview(roadmaps: &[Roadmap]) -> String {
    let mut out = String::new();
    for roadmap in roadmaps {
        out.push_str(&format!("{} {}\n", format!("[{}]", roadmap.id).dimmed(), roadmap.title.bold()));
        for step in &roadmap.steps {
            out.push_str(&format!("  {} {}\n", format!("[{}]", step.id).dimmed(), step.title));
            for resource in &step.resources {
                out.push_str(&format!(
                    "    {} {} {} {}\n",
                    format!("[{}]", resource.id).dimmed(),
                    resource.kind,
                    resource.title,
                    resource.url.underline()
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Resource, ResourceType, Step};

    fn plain() {
        colored::control::set_override(false);
    }

    fn step_view(locked: bool, status: StepStatus) -> StepView {
        StepView {
            step: Step {
                id: "102".into(),
                title: "CSS".into(),
                description: "Style things".into(),
                resources: vec![Resource {
                    id: "1002".into(),
                    title: "Flexbox Guide".into(),
                    description: None,
                    kind: ResourceType::Blog,
                    url: "https://example.com/flexbox".into(),
                }],
            },
            status,
            locked,
        }
    }

    #[test]
    fn locked_step_shows_resources_under_overlay_and_no_actions() {
        plain();
        let out = step_block("1", 1, &step_view(true, StepStatus::NotStarted));
        assert!(out.contains("Flexbox Guide https://example.com/flexbox"));
        assert!(out.find("Flexbox Guide") < out.find(LOCK_OVERLAY));
        assert!(!out.contains("start 1 102"));
        assert!(!out.contains("complete 1 102"));
    }

    #[test]
    fn open_step_lists_actions_for_its_status() {
        plain();
        let out = step_block("1", 1, &step_view(false, StepStatus::InProgress));
        assert!(out.contains("complete 1 102"));
        assert!(!out.contains("start 1 102"));
        assert!(!out.contains(LOCK_OVERLAY));
    }

    #[test]
    fn progress_bar_is_bounded() {
        plain();
        assert!(progress_bar(0).ends_with("  0%"));
        assert!(progress_bar(100).starts_with(&format!("[{}]", "#".repeat(BAR_WIDTH))));
    }
}
