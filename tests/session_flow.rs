use std::path::PathBuf;

use pathpulse::admin::{ADMIN_ROADMAPS_KEY, ResourceDraft};
use pathpulse::app::AppContext;
use pathpulse::auth::{LoginForm, ProfileSetupForm, SignupForm};
use pathpulse::catalog::Catalog;
use pathpulse::config::RulesConfig;
use pathpulse::error::ServiceError;
use pathpulse::notify::{RecordingNotifier, Severity};
use pathpulse::routes::Route;
use pathpulse::session::{SessionHolder, USER_KEY};
use pathpulse::storage::{FileStorage, SessionStorage};
use pathpulse::types::{ResourceType, Role, StepStatus, StepTransition};
use rstest::*;
use tempfile::TempDir;

type App = AppContext<FileStorage, RecordingNotifier>;

// === Test Fixtures ===

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn session_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session").join("session.json")
}

fn open_app(dir: &TempDir, rules: RulesConfig) -> App {
    let storage = FileStorage::open(session_path(dir)).expect("open session file");
    AppContext::new(
        storage,
        Catalog::embedded().expect("embedded catalog"),
        rules,
        RecordingNotifier::default(),
    )
}

fn form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.into(),
        password: password.into(),
    }
}

fn new_learner(app: &mut App) {
    app.signup(&SignupForm {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        password: "engine1".into(),
        confirm_password: "engine1".into(),
        role: Role::Learner,
    })
    .expect("signup");
    app.profile_setup(&ProfileSetupForm {
        interests: vec!["web-dev".into()],
        learning_goal: "Become a frontend developer".into(),
        weekly_time: 8,
    })
    .expect("setup");
}

// === Session persistence ===

#[rstest]
fn session_survives_reopen_and_logout_clears_it(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    let route = app.login(&form("john@example.com", "password123")).unwrap();
    assert_eq!(route, Route::Dashboard);
    drop(app);

    let mut app = open_app(&temp_dir, RulesConfig::default());
    assert_eq!(app.current().map(|p| p.id.as_str()), Some("user1"));

    assert_eq!(app.logout().unwrap(), Route::Landing);
    drop(app);

    let storage = FileStorage::open(session_path(&temp_dir)).unwrap();
    assert!(storage.get_item(USER_KEY).is_none());
    assert!(SessionHolder::hydrate(storage).current().is_none());
}

#[rstest]
fn corrupt_session_file_starts_logged_out(temp_dir: TempDir) {
    let path = session_path(&temp_dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "definitely not json").unwrap();
    let app = open_app(&temp_dir, RulesConfig::default());
    assert!(app.current().is_none());
}

#[rstest]
fn malformed_user_entry_starts_logged_out(temp_dir: TempDir) {
    let mut storage = FileStorage::open(session_path(&temp_dir)).unwrap();
    storage.set_item(USER_KEY, r#"{"id": 7}"#.into()).unwrap();
    drop(storage);
    let app = open_app(&temp_dir, RulesConfig::default());
    assert!(app.current().is_none());
}

// === Progress rules through the app ===

#[rstest]
fn new_learner_walks_a_roadmap(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    new_learner(&mut app);

    let view = app.roadmap_view("1").unwrap();
    assert!(!view.steps[0].locked);
    assert!(view.steps[1].locked);

    app.mark_step("1", "101", StepTransition::InProgress).unwrap();
    let outcome = app.mark_step("1", "101", StepTransition::Completed).unwrap();
    assert_eq!(outcome.profile.xp, 50);
    assert_eq!(
        outcome.new_badges.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        vec!["first-step"]
    );

    let repeat = app.mark_step("1", "101", StepTransition::Completed).unwrap();
    assert_eq!(repeat.profile.xp, 50);
    assert!(repeat.new_badges.is_empty());

    let view = app.roadmap_view("1").unwrap();
    assert_eq!(view.steps[0].status, StepStatus::Completed);
    assert!(!view.steps[1].locked);
    assert_eq!(view.percent, 50);

    let titles = app.notifier().titles();
    assert!(titles.contains(&"Step completed!"));
    assert!(titles.contains(&"New Badge: First Step"));
}

#[rstest]
fn locked_step_is_refused_and_nothing_is_written(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    new_learner(&mut app);
    let before = app.current().cloned();

    let err = app
        .mark_step("1", "102", StepTransition::InProgress)
        .unwrap_err();
    assert!(matches!(err, ServiceError::StepLocked(step) if step == "102"));
    assert_eq!(app.current().cloned(), before);

    let last = app.notifier().notifications.last().unwrap();
    assert_eq!(last.severity, Severity::Destructive);
}

#[rstest]
#[case(30, false)]
#[case(50, true)]
#[case(250, true)]
fn xp_per_step_is_configurable(
    temp_dir: TempDir,
    #[case] xp_per_step: u64,
    #[case] knowledge_seeker: bool,
) {
    let rules = RulesConfig {
        xp_per_step,
        ..RulesConfig::default()
    };
    let mut app = open_app(&temp_dir, rules);
    new_learner(&mut app);
    app.mark_step("2", "201", StepTransition::Completed).unwrap();
    let outcome = app.mark_step("2", "202", StepTransition::Completed).unwrap();

    assert_eq!(outcome.profile.xp, xp_per_step * 2);
    assert_eq!(outcome.profile.badges.contains("knowledge-seeker"), knowledge_seeker);
}

#[rstest]
fn unknown_ids_are_reported(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    new_learner(&mut app);
    assert!(matches!(
        app.mark_step("9", "101", StepTransition::Completed),
        Err(ServiceError::UnknownRoadmap(_))
    ));
    assert!(matches!(
        app.mark_step("1", "999", StepTransition::Completed),
        Err(ServiceError::UnknownStep { .. })
    ));
}

#[rstest]
fn status_change_without_login_is_refused(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    assert!(matches!(
        app.mark_step("1", "101", StepTransition::Completed),
        Err(ServiceError::NotLoggedIn)
    ));
}

// === Routing ===

#[rstest]
#[case::landing("/", Route::Landing)]
#[case::guarded_dashboard("/dashboard", Route::Login)]
#[case::guarded_roadmap("/roadmap/1", Route::Login)]
#[case::admin_page("/admin-dashboard", Route::Login)]
#[case::unknown("/nowhere", Route::NotFound("/nowhere".into()))]
fn logged_out_navigation(temp_dir: TempDir, #[case] path: &str, #[case] expected: Route) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    assert_eq!(app.navigate(path).route, expected);
}

#[rstest]
fn learner_is_turned_away_from_admin_dashboard(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    app.login(&form("john@example.com", "password123")).unwrap();
    assert_eq!(app.navigate("/admin-dashboard").route, Route::Login);
    assert_eq!(app.notifier().titles().last(), Some(&"Access Denied"));
    assert_eq!(app.navigate("/roadmap/42").route, Route::Dashboard);
}

// === Admin curation ===

#[rstest]
fn curated_resources_persist_and_learners_see_them(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    assert_eq!(
        app.admin_login(&form("admin@pathpulse.com", "admin123")).unwrap(),
        Route::AdminDashboard
    );
    let added = app
        .admin_add_resource(
            "1",
            "101",
            ResourceDraft {
                title: "HTML Forms".into(),
                description: "Inputs and validation".into(),
                kind: ResourceType::Blog,
                url: "https://example.com/forms".into(),
            },
        )
        .unwrap();
    app.admin_delete_resource("1", "101", "1001").unwrap();
    app.logout().unwrap();
    drop(app);

    let storage = FileStorage::open(session_path(&temp_dir)).unwrap();
    assert!(storage.get_item(ADMIN_ROADMAPS_KEY).is_some());
    drop(storage);

    let mut app = open_app(&temp_dir, RulesConfig::default());
    app.login(&form("john@example.com", "password123")).unwrap();
    let view = app.roadmap_view("1").unwrap();
    let ids: Vec<&str> = view.steps[0]
        .step
        .resources
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert!(ids.contains(&added.id.as_str()));
    assert!(!ids.contains(&"1001"));
}

#[rstest]
fn invalid_resource_draft_changes_nothing(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    app.admin_login(&form("admin@pathpulse.com", "admin123")).unwrap();
    let before = app.catalog().roadmaps.clone();
    let err = app
        .admin_add_resource("1", "101", ResourceDraft::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Admin(_)));
    assert_eq!(app.catalog().roadmaps, before);
    assert_eq!(app.notifier().titles().last(), Some(&"Missing information"));
}

#[rstest]
fn reset_clears_user_and_curation(temp_dir: TempDir) {
    let mut app = open_app(&temp_dir, RulesConfig::default());
    app.admin_login(&form("admin@pathpulse.com", "admin123")).unwrap();
    app.admin_delete_resource("2", "201", "2001").unwrap();
    app.reset().unwrap();
    assert!(app.current().is_none());
    assert_eq!(app.catalog().roadmaps, Catalog::embedded().unwrap().roadmaps);
    drop(app);

    let app = open_app(&temp_dir, RulesConfig::default());
    assert!(app.current().is_none());
    assert!(app.session().storage().get_item(ADMIN_ROADMAPS_KEY).is_none());
}
