use crate::admin::{self, AdminError, ResourceDraft};
use crate::auth::{self, LoginForm, ProfileSetupForm, SignupForm};
use crate::badges;
use crate::catalog::Catalog;
use crate::config::RulesConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::gating;
use crate::notify::{Notification, Notifier};
use crate::progress::{self, StepOutcome};
use crate::routes::{self, Resolution, Route};
use crate::session::SessionHolder;
use crate::storage::SessionStorage;
use crate::types::{Badge, Resource, Roadmap, Step, StepStatus, StepTransition, UserProfile};

#[derive(Clone, Debug)]
pub struct RoadmapSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub next_step: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DashboardView {
    pub profile: UserProfile,
    pub badges: Vec<Badge>,
    pub roadmaps: Vec<RoadmapSummary>,
}

#[derive(Clone, Debug)]
pub struct StepView {
    pub step: Step,
    pub status: StepStatus,
    pub locked: bool,
}

#[derive(Clone, Debug)]
pub struct RoadmapView {
    pub roadmap: Roadmap,
    pub percent: u8,
    pub steps: Vec<StepView>,
}

/// Everything one session needs: the current profile, the content it works
/// against, the rules and where user-facing messages go.
pub struct AppContext<S: SessionStorage, N: Notifier> {
    session: SessionHolder<S>,
    base: Catalog,
    catalog: Catalog,
    rules: RulesConfig,
    notifier: N,
}

impl<S: SessionStorage, N: Notifier> AppContext<S, N> {
    /// Restores the session from `storage` and overlays any admin-curated
    /// roadmaps on `catalog`.
    pub fn new(storage: S, catalog: Catalog, rules: RulesConfig, notifier: N) -> Self {
        let curated = admin::load_curated(&storage, &catalog.roadmaps);
        let session = SessionHolder::hydrate(storage);
        Self {
            session,
            catalog: catalog.with_roadmaps(curated),
            base: catalog,
            rules,
            notifier,
        }
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.session.current()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn session(&self) -> &SessionHolder<S> {
        &self.session
    }

    pub fn into_storage(self) -> S {
        self.session.into_storage()
    }

    fn reject(&mut self, title: &str, err: impl Into<ServiceError>) -> ServiceError {
        let err = err.into();
        self.notifier
            .notify(Notification::destructive(title, err.to_string()));
        err
    }

    /// The logged-in profile, or a "Not logged in" notification and error.
    pub fn require_user(&mut self) -> ServiceResult<UserProfile> {
        match self.session.current() {
            Some(profile) => Ok(profile.clone()),
            None => Err(self.reject("Not logged in", ServiceError::NotLoggedIn)),
        }
    }

    pub fn login(&mut self, form: &LoginForm) -> ServiceResult<Route> {
        let profile = match auth::authenticate(&self.catalog, form) {
            Ok(profile) => profile,
            Err(err) => return Err(self.reject(err.title(), err)),
        };
        let route = Route::home_for(&profile);
        self.notifier.notify(Notification::info(
            "Login successful",
            format!("Welcome back, {}!", profile.name),
        ));
        self.session.login(profile)?;
        Ok(route)
    }

    pub fn admin_login(&mut self, form: &LoginForm) -> ServiceResult<Route> {
        let profile = match auth::authenticate_admin(&self.catalog, form) {
            Ok(profile) => profile,
            Err(err) => return Err(self.reject(err.title(), err)),
        };
        self.notifier.notify(Notification::info(
            "Admin login successful",
            "Welcome to the admin dashboard.",
        ));
        self.session.login(profile)?;
        Ok(Route::AdminDashboard)
    }

    pub fn signup(&mut self, form: &SignupForm) -> ServiceResult<Route> {
        let profile = match auth::create_account(form) {
            Ok(profile) => profile,
            Err(err) => return Err(self.reject(err.title(), err)),
        };
        self.notifier.notify(Notification::info(
            "Account created",
            "Let's set up your learning profile.",
        ));
        self.session.login(profile)?;
        Ok(Route::ProfileSetup)
    }

    pub fn profile_setup(&mut self, form: &ProfileSetupForm) -> ServiceResult<Route> {
        let profile = self.require_user()?;
        let next = match auth::apply_profile_setup(&profile, form) {
            Ok(next) => next,
            Err(err) => return Err(self.reject(err.title(), err)),
        };
        self.notifier.notify(Notification::info(
            "Profile setup complete",
            "Your personalized roadmaps are ready.",
        ));
        self.session.login(next)?;
        Ok(Route::Dashboard)
    }

    pub fn logout(&mut self) -> ServiceResult<Route> {
        self.session.logout()?;
        self.notifier.notify(Notification::info(
            "Logged out",
            "You have been logged out successfully.",
        ));
        Ok(Route::Landing)
    }

    /// Ends the session: drops the user and every stored key, including the
    /// curated roadmaps.
    pub fn reset(&mut self) -> ServiceResult<()> {
        self.session.logout()?;
        self.session.storage_mut().clear()?;
        self.catalog = self.base.clone();
        tracing::info!("session storage cleared");
        Ok(())
    }

    /// Moves a step to `transition` for the current user. Locked steps are
    /// refused with the profile untouched.
    pub fn mark_step(
        &mut self,
        roadmap_id: &str,
        step_id: &str,
        transition: StepTransition,
    ) -> ServiceResult<StepOutcome> {
        let profile = self.require_user()?;
        let Some(roadmap) = self.catalog.roadmap(roadmap_id) else {
            let err = ServiceError::UnknownRoadmap(roadmap_id.to_string());
            return Err(self.reject("Not found", err));
        };
        let Some(index) = roadmap.step_index(step_id) else {
            let err = ServiceError::UnknownStep {
                roadmap_id: roadmap_id.to_string(),
                step_id: step_id.to_string(),
            };
            return Err(self.reject("Not found", err));
        };
        if gating::is_locked(roadmap, index, &profile.progress_for(roadmap_id)) {
            tracing::debug!(roadmap = roadmap_id, step = step_id, "refused status change on locked step");
            return Err(self.reject("Step locked", ServiceError::StepLocked(step_id.to_string())));
        }

        let outcome = progress::apply_step_status(
            &profile,
            roadmap_id,
            step_id,
            transition,
            &self.rules,
            &mut self.notifier,
        );
        if let Err(err) = self.session.login(outcome.profile.clone()) {
            tracing::warn!(error = %err, "failed to persist profile after status change");
        }
        Ok(outcome)
    }

    pub fn dashboard(&mut self) -> ServiceResult<DashboardView> {
        let profile = self.require_user()?;
        let roadmaps = self
            .catalog
            .roadmaps
            .iter()
            .map(|roadmap| {
                let progress = profile.progress_for(&roadmap.id);
                RoadmapSummary {
                    id: roadmap.id.clone(),
                    title: roadmap.title.clone(),
                    description: roadmap.description.clone(),
                    completed: roadmap
                        .steps
                        .iter()
                        .filter(|s| progress.is_completed(&s.id))
                        .count(),
                    total: roadmap.steps.len(),
                    percent: progress::completion_percent(roadmap, &progress),
                    next_step: progress::next_step(roadmap, &progress).map(|s| s.title.clone()),
                }
            })
            .collect();
        let badges = badges::earned_badges(&profile, &self.rules.badges)
            .into_iter()
            .cloned()
            .collect();
        Ok(DashboardView {
            profile,
            badges,
            roadmaps,
        })
    }

    pub fn roadmap_view(&mut self, roadmap_id: &str) -> ServiceResult<RoadmapView> {
        let profile = self.require_user()?;
        let Some(roadmap) = self.catalog.roadmap(roadmap_id).cloned() else {
            let err = ServiceError::UnknownRoadmap(roadmap_id.to_string());
            return Err(self.reject("Not found", err));
        };
        let progress = profile.progress_for(roadmap_id);
        let locks = gating::lock_states(&roadmap, &progress);
        let steps = roadmap
            .steps
            .iter()
            .zip(locks)
            .map(|(step, locked)| StepView {
                step: step.clone(),
                status: progress.status_of(&step.id),
                locked,
            })
            .collect();
        Ok(RoadmapView {
            percent: progress::completion_percent(&roadmap, &progress),
            roadmap,
            steps,
        })
    }

    /// Resolves `path` against the page guards and surfaces any notice.
    pub fn navigate(&mut self, path: &str) -> Resolution {
        let resolution = routes::resolve(Route::parse(path), self.session.current(), &self.catalog);
        if let Some(notice) = &resolution.notice {
            self.notifier.notify(notice.clone());
        }
        resolution
    }

    fn curate<T>(
        &mut self,
        success: &str,
        edit: impl FnOnce(&mut Vec<Roadmap>) -> Result<T, AdminError>,
    ) -> ServiceResult<T> {
        if let Err(err) = admin::require_admin(self.session.current()) {
            return Err(self.reject(err.title(), err));
        }
        let mut roadmaps = self.catalog.roadmaps.clone();
        let result = match edit(&mut roadmaps) {
            Ok(result) => result,
            Err(err) => return Err(self.reject(err.title(), err)),
        };
        if let Err(err) = admin::save_curated(self.session.storage_mut(), &roadmaps) {
            return Err(self.reject(err.title(), err));
        }
        self.catalog = self.base.with_roadmaps(roadmaps);
        self.notifier.notify(Notification::info(success, ""));
        Ok(result)
    }

    pub fn admin_add_resource(
        &mut self,
        roadmap_id: &str,
        step_id: &str,
        draft: ResourceDraft,
    ) -> ServiceResult<Resource> {
        self.curate("Resource added", |roadmaps| {
            admin::add_resource(roadmaps, roadmap_id, step_id, draft)
        })
    }

    pub fn admin_update_resource(
        &mut self,
        roadmap_id: &str,
        step_id: &str,
        resource_id: &str,
        draft: ResourceDraft,
    ) -> ServiceResult<Resource> {
        self.curate("Resource updated", |roadmaps| {
            admin::update_resource(roadmaps, roadmap_id, step_id, resource_id, draft)
        })
    }

    pub fn admin_delete_resource(
        &mut self,
        roadmap_id: &str,
        step_id: &str,
        resource_id: &str,
    ) -> ServiceResult<Resource> {
        self.curate("Resource deleted", |roadmaps| {
            admin::delete_resource(roadmaps, roadmap_id, step_id, resource_id)
        })
    }
}
