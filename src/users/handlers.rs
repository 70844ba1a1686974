use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo_types::User, services::AuthUser},
    error::ApiError,
    state::AppState,
    users::{
        dto::{AssignRoleRequest, AssignRoleResponse, ListUsersQuery, UserListResponse},
        policy, repo,
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(assign_role))
}

async fn load_caller(state: &AppState, caller_id: Uuid) -> Result<User, ApiError> {
    User::find_by_id(&state.db, caller_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown caller".into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let caller = load_caller(&state, caller_id).await?;
    if !policy::can_list_users(caller.role) {
        warn!(caller_id = %caller.id, role = ?caller.role, "user listing denied");
        return Err(ApiError::Forbidden("admin access required".into()));
    }

    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let search = query.search.trim();
    let search = (!search.is_empty()).then_some(search);

    let users = repo::list(&state.db, search, query.role, per_page, (page - 1) * per_page).await?;
    let total = repo::count(&state.db, search, query.role).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

#[instrument(skip(state, payload))]
pub async fn assign_role(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(target_id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<Json<AssignRoleResponse>, ApiError> {
    let caller = load_caller(&state, caller_id).await?;
    if !policy::can_assign_roles(caller.role) {
        warn!(caller_id = %caller.id, role = ?caller.role, "role assignment denied");
        return Err(ApiError::Forbidden("only a superadmin can assign roles".into()));
    }

    let target = User::find_by_id(&state.db, target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if policy::is_protected(&target.email, &state.config.protected_emails) {
        warn!(target_id = %target.id, "role change refused for protected account");
        return Err(ApiError::Forbidden("this account's role cannot be changed".into()));
    }

    let updated = repo::update_role(&state.db, target_id, payload.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    info!(caller_id = %caller.id, target_id = %updated.id, role = ?updated.role, "role assigned");
    Ok(Json(AssignRoleResponse {
        message: "user role updated".into(),
        user: updated.into(),
    }))
}
