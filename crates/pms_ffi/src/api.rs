//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Resolve the acting identity from the persisted session, never from
//!   caller-supplied role strings, for every mutating call.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported inside response envelopes as UTF-8 messages.
//! - Navigation calls are pure and never touch the database.

use log::warn;
use pms_core::analytics::dashboard_summary as dashboard_summary_inner;
use pms_core::auth::store::{check_persisted_session, load_record};
use pms_core::db::{now_epoch_ms, open_db};
use pms_core::model::goal::{Goal, GoalCategory, GoalPriority};
use pms_core::navigation::menu::menu_for_role_str;
use pms_core::navigation::router::resolve_route_for;
use pms_core::repo::goal_repo::{GoalListQuery, SqliteGoalRepository};
use pms_core::repo::review_repo::{ReviewListQuery, ReviewRepository, SqliteReviewRepository};
use pms_core::repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
use pms_core::seed::seed_demo_data;
use pms_core::service::goal_service::{GoalService, NewGoalRequest};
use pms_core::{
    core_version as core_version_inner, default_dashboard_for, init_logging as init_logging_inner,
    ping as ping_inner, Actor, AppConfig, AuthSettings, AuthStore, DashboardView,
    DemoCredentialVerifier, MenuItem, Route, SessionCheck, SessionUser,
};
use rusqlite::Connection;
use std::sync::{Once, OnceLock};
use uuid::Uuid;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static SEED_ONCE: Once = Once::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Identity projection returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiUser {
    pub id: String,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    /// Upper-case role id (`ADMIN|HR|MANAGER|TEAMLEAD|EMPLOYEE`).
    pub role: String,
    pub department: Option<String>,
}

/// Auth state envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub is_authenticated: bool,
    pub user: Option<FfiUser>,
    /// Landing dashboard id for the signed-in role, empty when signed out.
    pub default_dashboard: String,
    /// Empty on success; user-facing error otherwise.
    pub error: String,
}

impl AuthResponse {
    fn signed_in(user: &SessionUser) -> Self {
        Self {
            is_authenticated: true,
            user: Some(to_ffi_user(user)),
            default_dashboard: pms_core::default_dashboard(user.role).as_str().to_string(),
            error: String::new(),
        }
    }

    fn signed_out(error: impl Into<String>) -> Self {
        Self {
            is_authenticated: false,
            user: None,
            default_dashboard: String::new(),
            error: error.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Affected entity id when the action created or changed one.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Menu node filtered for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub children: Vec<MenuNode>,
}

/// Resolved content route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResponse {
    /// `dashboard|page`.
    pub kind: String,
    /// Dashboard view id or menu id.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub progress: u8,
    pub due_date: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub items: Vec<GoalItem>,
    pub message: String,
}

/// Dashboard card figures for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummaryResponse {
    pub ok: bool,
    pub view: String,
    pub headcount: u32,
    pub total_goals: u32,
    pub completed_goals: u32,
    pub overdue_goals: u32,
    pub average_progress: f64,
    pub completion_rate: f64,
    pub pending_reviews: u32,
    pub average_manager_rating: Option<f64>,
    pub message: String,
}

/// Signs in with email and password.
///
/// # FFI contract
/// - Sync call, DB-backed; applies the configured simulated login delay.
/// - Never panics. Failure leaves the store signed out and sets `error`.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_login(email: String, password: String) -> AuthResponse {
    let conn = match open_app_db() {
        Ok(conn) => conn,
        Err(err) => return AuthResponse::signed_out(err),
    };
    let mut store = match AuthStore::open(&conn, DemoCredentialVerifier, app_auth_settings()) {
        Ok(store) => store,
        Err(err) => return AuthResponse::signed_out(err.to_string()),
    };
    match store.login(&email, &password) {
        Ok(user) => AuthResponse::signed_in(&user),
        Err(err) => AuthResponse::signed_out(err.to_string()),
    }
}

/// Signs out and removes the persisted session.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_logout() -> ActionResponse {
    let result = open_app_db().and_then(|conn| {
        let mut store = AuthStore::open(&conn, DemoCredentialVerifier, app_auth_settings())
            .map_err(|err| err.to_string())?;
        store.logout().map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => ActionResponse::success("Signed out.", None),
        Err(err) => ActionResponse::failure(format!("auth_logout failed: {err}")),
    }
}

/// Rehydrates auth state from persistence.
///
/// Expired or malformed sessions are cleared and reported as signed out.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_state() -> AuthResponse {
    match current_session_user() {
        Ok(Some(user)) => AuthResponse::signed_in(&user),
        Ok(None) => AuthResponse::signed_out(String::new()),
        Err(err) => AuthResponse::signed_out(err),
    }
}

/// Runs one liveness check; the UI calls this on its interval timer.
///
/// Returns `valid|logged_out|no_session`, or `error: <message>`.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_check_session() -> String {
    let result = open_app_db().and_then(|conn| {
        check_persisted_session(&conn, now_epoch_ms()).map_err(|err| err.to_string())
    });
    match result {
        Ok(check) => check.as_str().to_string(),
        Err(err) => format!("error: {err}"),
    }
}

/// Landing dashboard id (`personal|team|organization`) for a role string.
///
/// Unknown roles land on `personal`.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_default_dashboard(role: String) -> String {
    default_dashboard_for(&role).as_str().to_string()
}

/// Menu tree visible to a role string.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_menu_for_role(role: String) -> Vec<MenuNode> {
    menu_for_role_str(&role).iter().map(to_menu_node).collect()
}

/// Resolves a menu id to a content route, falling back to the role's
/// default dashboard for unknown or forbidden ids.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_resolve_route(menu_id: String, role: String) -> RouteResponse {
    match resolve_route_for(&menu_id, &role) {
        Route::Dashboard(view) => RouteResponse {
            kind: "dashboard".to_string(),
            target: view.as_str().to_string(),
        },
        Route::Page(id) => RouteResponse {
            kind: "page".to_string(),
            target: id.as_str().to_string(),
        },
    }
}

/// Lists goals owned by `user_id`, visible to the owner and to TEAMLEAD and above.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_list_for_user(user_id: String) -> GoalListResponse {
    let result = parse_id(&user_id).and_then(|owner_id| {
        let actor = require_actor()?;
        with_goal_service(|service| {
            service
                .goals_visible_to(&actor, owner_id)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(goals) => {
            let items = goals.iter().map(to_goal_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No goals.".to_string()
            } else {
                format!("Found {} goal(s).", items.len())
            };
            GoalListResponse { items, message }
        }
        Err(err) => GoalListResponse {
            items: Vec::new(),
            message: format!("goals_list_for_user failed: {err}"),
        },
    }
}

/// Creates a goal for `owner_id` on behalf of the signed-in user.
///
/// Input semantics:
/// - `category`: `performance|development|behavioral|project|learning`.
/// - `priority`: `low|medium|high|critical`; `None` means medium.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_create(
    owner_id: String,
    title: String,
    category: String,
    priority: Option<String>,
    due_date: Option<i64>,
    tags: Vec<String>,
) -> ActionResponse {
    let result = create_goal_for_session(owner_id, title, category, priority, due_date, tags);
    match result {
        Ok(goal) => ActionResponse::success("Goal created.", Some(goal.uuid.to_string())),
        Err(err) => ActionResponse::failure(format!("goals_create failed: {err}")),
    }
}

/// Sets goal progress (0..=100) on behalf of the signed-in user.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_update_progress(goal_id: String, progress: u8) -> ActionResponse {
    let result = parse_id(&goal_id).and_then(|goal_id| {
        let actor = require_actor()?;
        with_goal_service(|service| {
            service
                .update_progress(&actor, goal_id, progress)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(goal) => ActionResponse::success(
            format!("Progress set to {}% ({}).", goal.progress, goal.status.as_str()),
            Some(goal.uuid.to_string()),
        ),
        Err(err) => ActionResponse::failure(format!("goals_update_progress failed: {err}")),
    }
}

/// Dashboard figures for `view` as seen by the signed-in user.
///
/// `view = None` uses the role's default dashboard. Views the role may not
/// open are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_summary(view: Option<String>) -> DashboardSummaryResponse {
    match build_dashboard_summary(view.as_deref()) {
        Ok(response) => response,
        Err(err) => DashboardSummaryResponse {
            ok: false,
            view: String::new(),
            headcount: 0,
            total_goals: 0,
            completed_goals: 0,
            overdue_goals: 0,
            average_progress: 0.0,
            completion_rate: 0.0,
            pending_reviews: 0,
            average_manager_rating: None,
            message: format!("dashboard_summary failed: {err}"),
        },
    }
}

fn create_goal_for_session(
    owner_id: String,
    title: String,
    category: String,
    priority: Option<String>,
    due_date: Option<i64>,
    tags: Vec<String>,
) -> Result<Goal, String> {
    let owner_id = parse_id(&owner_id)?;
    let category = GoalCategory::parse(&category)
        .ok_or_else(|| format!("unknown goal category `{}`", category.trim()))?;
    let priority = match priority.as_deref() {
        None => GoalPriority::Medium,
        Some(raw) => GoalPriority::parse(raw)
            .ok_or_else(|| format!("unknown goal priority `{}`", raw.trim()))?,
    };
    let actor = require_actor()?;
    let request = NewGoalRequest {
        owner_id,
        title,
        description: String::new(),
        category,
        priority,
        due_date,
        tags,
    };
    with_goal_service(|service| {
        service
            .create_goal(&actor, request)
            .map_err(|err| err.to_string())
    })
}

fn build_dashboard_summary(view: Option<&str>) -> Result<DashboardSummaryResponse, String> {
    let actor = require_actor()?;
    let view = match view {
        None => pms_core::default_dashboard(actor.role),
        Some(raw) => {
            DashboardView::parse(raw).ok_or_else(|| format!("unknown dashboard `{}`", raw.trim()))?
        }
    };
    if !pms_core::navigation::dashboard::can_view(actor.role, view) {
        return Err(format!("role {} may not open the {} dashboard", actor.role, view));
    }

    let conn = open_app_db()?;
    let users = SqliteUserRepository::new(&conn)
        .list_all_users(&UserListQuery::default())
        .map_err(|err| err.to_string())?;
    let goals = GoalService::new(SqliteGoalRepository::new(&conn))
        .list_all_goals(&GoalListQuery::default())
        .map_err(|err| err.to_string())?;
    let reviews = SqliteReviewRepository::new(&conn)
        .list_all_reviews(&ReviewListQuery::default())
        .map_err(|err| err.to_string())?;

    let summary = dashboard_summary_inner(view, actor.id, &users, &goals, &reviews);
    let pending_reviews = summary.reviews.total - summary.reviews.completed;
    Ok(DashboardSummaryResponse {
        ok: true,
        view: summary.view.as_str().to_string(),
        headcount: to_u32(summary.headcount),
        total_goals: to_u32(summary.goals.total),
        completed_goals: to_u32(summary.goals.completed),
        overdue_goals: to_u32(summary.goals.overdue),
        average_progress: summary.goals.average_progress,
        completion_rate: summary.goals.completion_rate,
        pending_reviews: to_u32(pending_reviews),
        average_manager_rating: summary.reviews.average_manager_rating,
        message: String::new(),
    })
}

fn app_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(|| match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!("event=config_load module=ffi status=fallback error={err}");
            AppConfig::default()
        }
    })
}

fn app_auth_settings() -> AuthSettings {
    AuthSettings::from(app_config())
}

/// Opens the app DB and seeds demo data once per process.
fn open_app_db() -> Result<Connection, String> {
    let conn = open_db(&app_config().db_path).map_err(|err| format!("DB open failed: {err}"))?;
    SEED_ONCE.call_once(|| {
        if let Err(err) = seed_demo_data(&conn) {
            warn!("event=seed module=ffi status=error error={err}");
        }
    });
    Ok(conn)
}

fn current_session_user() -> Result<Option<SessionUser>, String> {
    let conn = open_app_db()?;
    match check_persisted_session(&conn, now_epoch_ms()).map_err(|err| err.to_string())? {
        SessionCheck::Valid => Ok(load_record(&conn)
            .map_err(|err| err.to_string())?
            .and_then(|record| record.user)),
        SessionCheck::LoggedOut | SessionCheck::NoSession => Ok(None),
    }
}

fn require_actor() -> Result<Actor, String> {
    current_session_user()?
        .map(|user| Actor::from(&user))
        .ok_or_else(|| "not signed in".to_string())
}

fn with_goal_service<T>(
    f: impl FnOnce(&GoalService<SqliteGoalRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_app_db()?;
    let service = GoalService::new(SqliteGoalRepository::new(&conn));
    f(&service)
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{}`", raw.trim()))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_ffi_user(user: &SessionUser) -> FfiUser {
    FfiUser {
        id: user.id.to_string(),
        employee_id: user.employee_id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        department: user.department.clone(),
    }
}

fn to_menu_node(item: &MenuItem) -> MenuNode {
    MenuNode {
        id: item.id.as_str().to_string(),
        label: item.label.to_string(),
        icon: item.icon.to_string(),
        children: item.children.iter().map(to_menu_node).collect(),
    }
}

fn to_goal_item(goal: &Goal) -> GoalItem {
    GoalItem {
        id: goal.uuid.to_string(),
        owner_id: goal.owner_id.to_string(),
        title: goal.title.clone(),
        category: goal.category.as_str().to_string(),
        priority: goal.priority.as_str().to_string(),
        status: goal.status.as_str().to_string(),
        progress: goal.progress,
        due_date: goal.due_date,
        tags: goal.tags.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth_check_session, auth_login, auth_logout, auth_state, core_version, dashboard_summary,
        goals_create, goals_list_for_user, goals_update_progress, init_logging,
        nav_default_dashboard, nav_menu_for_role, nav_resolve_route, ping,
    };
    use pms_core::auth::credentials::demo_account_for_role;
    use pms_core::{Role, DEMO_PASSWORD};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn navigation_follows_role_tables() {
        assert_eq!(nav_default_dashboard("HR".to_string()), "organization");
        assert_eq!(nav_default_dashboard("teamlead".to_string()), "team");
        assert_eq!(nav_default_dashboard("intern".to_string()), "personal");

        let menu = nav_menu_for_role("EMPLOYEE".to_string());
        assert!(menu.iter().all(|node| node.id != "users"));
        assert!(menu.iter().any(|node| node.id == "dashboard"));

        let route = nav_resolve_route("no-such-page".to_string(), "MANAGER".to_string());
        assert_eq!(route.kind, "dashboard");
        assert_eq!(route.target, "team");

        let route = nav_resolve_route("users".to_string(), "ADMIN".to_string());
        assert_eq!(route.kind, "page");
        assert_eq!(route.target, "users");
    }

    #[test]
    fn goals_list_rejects_malformed_ids() {
        let response = goals_list_for_user("not-a-uuid".to_string());
        assert!(response.items.is_empty());
        assert!(response.message.contains("invalid id"));
    }

    // Auth state is process-wide, so the whole session flow lives in one test.
    #[test]
    fn session_flow_covers_login_goals_dashboard_and_logout() {
        let rejected = auth_login("employee@company.com".to_string(), "nope".to_string());
        assert!(!rejected.is_authenticated);
        assert!(!rejected.error.is_empty());

        let signed_in = auth_login(
            "employee@company.com".to_string(),
            DEMO_PASSWORD.to_string(),
        );
        assert!(signed_in.is_authenticated, "{}", signed_in.error);
        assert_eq!(signed_in.default_dashboard, "personal");
        let user = signed_in.user.expect("signed-in user");
        assert_eq!(user.role, "EMPLOYEE");
        assert_eq!(auth_check_session(), "valid");

        let created = goals_create(
            user.id.clone(),
            "Finish onboarding".to_string(),
            "learning".to_string(),
            None,
            None,
            vec!["Onboarding".to_string()],
        );
        assert!(created.ok, "{}", created.message);
        let goal_id = created.id.expect("created goal id");

        let updated = goals_update_progress(goal_id.clone(), 100);
        assert!(updated.ok, "{}", updated.message);
        assert!(updated.message.contains("completed"));

        let listed = goals_list_for_user(user.id.clone());
        let item = listed
            .items
            .iter()
            .find(|item| item.id == goal_id)
            .expect("created goal listed");
        assert_eq!(item.tags, vec!["onboarding".to_string()]);

        let manager_id = demo_account_for_role(Role::Manager).user_id().to_string();
        let foreign = goals_list_for_user(manager_id);
        assert!(foreign.items.is_empty());
        assert!(foreign.message.contains("failed"), "{}", foreign.message);

        let summary = dashboard_summary(None);
        assert!(summary.ok, "{}", summary.message);
        assert_eq!(summary.view, "personal");
        assert!(summary.completed_goals >= 1);
        assert!(!dashboard_summary(Some("organization".to_string())).ok);

        assert!(auth_logout().ok);
        assert!(!auth_state().is_authenticated);
        assert_eq!(auth_check_session(), "no_session");

        let anonymous = goals_update_progress(goal_id, 10);
        assert!(!anonymous.ok);
        assert!(anonymous.message.contains("not signed in"));

        let anonymous_list = goals_list_for_user(user.id);
        assert!(anonymous_list.items.is_empty());
        assert!(anonymous_list.message.contains("not signed in"));
    }
}
