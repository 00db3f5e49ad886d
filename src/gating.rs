use crate::types::{Roadmap, RoadmapProgress};

/// A step is open once the step right before it is completed. The first step
/// is always open; an index past the end is treated as locked.
pub fn is_locked(roadmap: &Roadmap, index: usize, progress: &RoadmapProgress) -> bool {
    if index >= roadmap.steps.len() {
        return true;
    }
    match index.checked_sub(1) {
        None => false,
        Some(previous) => !progress.is_completed(&roadmap.steps[previous].id),
    }
}

/// Lock state for every step, in roadmap order.
pub fn lock_states(roadmap: &Roadmap, progress: &RoadmapProgress) -> Vec<bool> {
    (0..roadmap.steps.len())
        .map(|index| is_locked(roadmap, index, progress))
        .collect()
}
