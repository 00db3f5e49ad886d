use chrono::Utc;
use thiserror::Error;
use ulid::Ulid;

use crate::catalog::Catalog;
use crate::types::{Role, UserProfile};
use crate::validator;

/// Interests offered during profile setup, as `(id, label)`.
pub const INTERESTS: [(&str, &str); 6] = [
    ("web-dev", "Web Development"),
    ("mobile-dev", "Mobile Development"),
    ("data-science", "Data Science"),
    ("ui-ux", "UI/UX Design"),
    ("devops", "DevOps"),
    ("cybersecurity", "Cybersecurity"),
];

pub const WEEKLY_TIME_RANGE: std::ops::RangeInclusive<u32> = 1..=40;
pub const DEFAULT_WEEKLY_TIME: u32 = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    #[error("Invalid admin credentials. Please try again.")]
    InvalidAdminCredentials,
    #[error("Please make sure your passwords match.")]
    PasswordMismatch,
    #[error("Please select at least one interest.")]
    NoInterests,
    #[error("Please set a learning goal to continue.")]
    NoLearningGoal,
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
}

impl AuthError {
    /// Headline shown with the error message.
    pub fn title(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Login failed",
            AuthError::InvalidAdminCredentials => "Admin login failed",
            AuthError::PasswordMismatch => "Passwords do not match",
            AuthError::NoInterests => "Select interests",
            AuthError::NoLearningGoal => "Set a learning goal",
            AuthError::Validation(_) => "Missing information",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

#[derive(Clone, Debug)]
pub struct ProfileSetupForm {
    pub interests: Vec<String>,
    pub learning_goal: String,
    pub weekly_time: u32,
}

impl Default for ProfileSetupForm {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            learning_goal: String::new(),
            weekly_time: DEFAULT_WEEKLY_TIME,
        }
    }
}

/// Looks the credentials up in the catalog and returns the profile without
/// its password.
pub fn authenticate(catalog: &Catalog, form: &LoginForm) -> Result<UserProfile, AuthError> {
    match catalog.find_user(&form.email, &form.password) {
        Some(user) => {
            tracing::info!(user = %user.profile.id, role = %user.profile.role, "login");
            Ok(user.clone().into_profile())
        }
        None => {
            tracing::debug!("login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Like [`authenticate`] but only admins get through.
pub fn authenticate_admin(catalog: &Catalog, form: &LoginForm) -> Result<UserProfile, AuthError> {
    match catalog.find_user(&form.email, &form.password) {
        Some(user) if user.profile.is_admin() => {
            tracing::info!(user = %user.profile.id, "admin login");
            Ok(user.clone().into_profile())
        }
        _ => Err(AuthError::InvalidAdminCredentials),
    }
}

/// Builds a fresh zero-valued profile for a new account.
pub fn create_account(form: &SignupForm) -> Result<UserProfile, AuthError> {
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let mut errors = validator::required("Full name", &form.name);
    errors.extend(validator::email(&form.email));
    errors.extend(validator::password(&form.password));
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let mut profile = UserProfile::new(
        format!("user-{}", Ulid::new().to_string().to_ascii_lowercase()),
        form.name.trim(),
        form.email.trim(),
        form.role,
    );
    profile.joined_at = Some(Utc::now().to_rfc3339());
    tracing::info!(user = %profile.id, role = %profile.role, "account created");
    Ok(profile)
}

/// Returns `profile` with the setup answers applied.
pub fn apply_profile_setup(
    profile: &UserProfile,
    form: &ProfileSetupForm,
) -> Result<UserProfile, AuthError> {
    if form.interests.is_empty() {
        return Err(AuthError::NoInterests);
    }
    if form.learning_goal.trim().is_empty() {
        return Err(AuthError::NoLearningGoal);
    }

    let mut errors = Vec::new();
    for interest in &form.interests {
        if !INTERESTS.iter().any(|(id, _)| *id == interest.as_str()) {
            errors.push(format!("Unknown interest \"{interest}\"."));
        }
    }
    if !WEEKLY_TIME_RANGE.contains(&form.weekly_time) {
        errors.push(format!(
            "Weekly time must be between {} and {} hours.",
            WEEKLY_TIME_RANGE.start(),
            WEEKLY_TIME_RANGE.end()
        ));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let mut next = profile.clone();
    next.interests = form.interests.clone();
    next.learning_goal = Some(form.learning_goal.trim().to_string());
    next.weekly_time = form.weekly_time;
    Ok(next)
}

pub fn interest_label(id: &str) -> &str {
    INTERESTS
        .iter()
        .find(|(known, _)| *known == id)
        .map_or(id, |(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    fn signup(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            role: Role::Learner,
        }
    }

    #[test]
    fn unknown_email_and_wrong_password_look_the_same() {
        let c = catalog();
        let unknown = authenticate(&c, &login("ghost@example.com", "password123")).unwrap_err();
        let wrong = authenticate(&c, &login("john@example.com", "nope")).unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.title(), "Login failed");
    }

    #[test]
    fn admin_login_rejects_learners() {
        let c = catalog();
        assert_eq!(
            authenticate_admin(&c, &login("john@example.com", "password123")).unwrap_err(),
            AuthError::InvalidAdminCredentials
        );
        let admin = authenticate_admin(&c, &login("Admin@PathPulse.com", "admin123")).unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn signup_checks_passwords_first() {
        assert_eq!(
            create_account(&signup("secret1", "secret2")).unwrap_err(),
            AuthError::PasswordMismatch
        );
        assert!(matches!(
            create_account(&signup("short", "short")).unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[test]
    fn signup_creates_zero_valued_profile() {
        let profile = create_account(&signup("secret1", "secret1")).unwrap();
        assert!(profile.id.starts_with("user-"));
        assert_eq!(profile.xp, 0);
        assert!(profile.badges.is_empty());
        assert!(profile.progress.is_empty());
        assert!(profile.joined_at.is_some());
        assert!(!profile.has_setup());
    }

    #[test]
    fn profile_setup_requires_interest_and_goal() {
        let base = create_account(&signup("secret1", "secret1")).unwrap();
        let mut form = ProfileSetupForm::default();
        assert_eq!(apply_profile_setup(&base, &form).unwrap_err(), AuthError::NoInterests);
        form.interests = vec!["web-dev".into()];
        assert_eq!(apply_profile_setup(&base, &form).unwrap_err(), AuthError::NoLearningGoal);
        form.learning_goal = "Ship a portfolio site".into();
        let done = apply_profile_setup(&base, &form).unwrap();
        assert!(done.has_setup());
        assert_eq!(done.weekly_time, DEFAULT_WEEKLY_TIME);
        assert_eq!(interest_label("web-dev"), "Web Development");
    }

    #[test]
    fn profile_setup_rejects_out_of_range_hours() {
        let base = create_account(&signup("secret1", "secret1")).unwrap();
        let form = ProfileSetupForm {
            interests: vec!["devops".into()],
            learning_goal: "Automate deploys".into(),
            weekly_time: 41,
        };
        assert!(matches!(
            apply_profile_setup(&base, &form),
            Err(AuthError::Validation(_))
        ));
    }
}
