//! Route definitions for the admin HTTP API.
//!
//! All routes are mounted under `/api`. Everything except login and the
//! health check sits behind `require_auth`; mutating requests on those
//! routes are written to the access log, and each route carries its own
//! permission guard.

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{MethodRouter, delete, get, post, put},
};

use crate::handlers;
use crate::middleware::{PermissionGuard, record_access, require_auth, require_permissions};
use crate::state::AppState;

const ORG_READ: &[&str] = &["org:read"];
const ORG_CREATE: &[&str] = &["org:create"];
const ORG_UPDATE: &[&str] = &["org:update"];
const ORG_DELETE: &[&str] = &["org:delete"];

const MENU_READ: &[&str] = &["menu:read"];
const MENU_CREATE: &[&str] = &["menu:create"];
const MENU_UPDATE: &[&str] = &["menu:update"];
const MENU_DELETE: &[&str] = &["menu:delete"];

const USER_READ: &[&str] = &["user:read"];
const USER_CREATE: &[&str] = &["user:create"];
const USER_UPDATE: &[&str] = &["user:update"];
const USER_DELETE: &[&str] = &["user:delete"];

const ROLE_READ: &[&str] = &["role:read"];
const ROLE_CREATE: &[&str] = &["role:create"];
const ROLE_UPDATE: &[&str] = &["role:update"];
const ROLE_DELETE: &[&str] = &["role:delete"];

const DICT_READ: &[&str] = &["dict:read"];
const DICT_CREATE: &[&str] = &["dict:create"];
const DICT_UPDATE: &[&str] = &["dict:update"];
const DICT_DELETE: &[&str] = &["dict:delete"];

const LOG_READ: &[&str] = &["log:read"];
const LOG_DELETE: &[&str] = &["log:delete"];

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(organization_routes())
        .merge(menu_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(dict_routes())
        .merge(log_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state.access_log_service),
            record_access,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state.authority),
            require_auth,
        ));

    let public = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
}

/// Wraps `route` in a guard accepting any of `required`.
fn guarded(
    required: &'static [&'static str],
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(axum_middleware::from_fn_with_state(
        PermissionGuard::new(required),
        require_permissions,
    ))
}

/// Session and self-service endpoints, open to any signed-in user
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/menus", get(handlers::auth::menus))
        .route(
            "/profile",
            get(handlers::profile::get).put(handlers::profile::update),
        )
}

/// Organization tree
fn organization_routes() -> Router<AppState> {
    use handlers::organization as h;

    Router::new()
        .route(
            "/organizations",
            guarded(ORG_READ, get(h::list)).merge(guarded(ORG_CREATE, post(h::create))),
        )
        .route("/organizations/tree", guarded(ORG_READ, get(h::tree)))
        .route(
            "/organizations/{id}",
            guarded(ORG_READ, get(h::get))
                .merge(guarded(ORG_UPDATE, put(h::update)))
                .merge(guarded(ORG_DELETE, delete(h::delete))),
        )
        .route(
            "/organizations/{id}/parent",
            guarded(ORG_UPDATE, put(h::move_to)),
        )
        .route(
            "/organizations/{id}/ancestors",
            guarded(ORG_READ, get(h::ancestors)),
        )
        .route(
            "/organizations/{id}/descendants",
            guarded(ORG_READ, get(h::descendants)),
        )
        .route(
            "/organizations/{id}/subtree",
            guarded(ORG_READ, get(h::subtree)),
        )
        .route(
            "/organizations/{id}/users",
            guarded(&["org:read", "user:read"], get(h::users)),
        )
}

/// Menu tree
fn menu_routes() -> Router<AppState> {
    use handlers::menu as h;

    Router::new()
        .route(
            "/menus",
            guarded(MENU_READ, get(h::list)).merge(guarded(MENU_CREATE, post(h::create))),
        )
        .route("/menus/tree", guarded(MENU_READ, get(h::tree)))
        .route(
            "/menus/{id}",
            guarded(MENU_READ, get(h::get))
                .merge(guarded(MENU_UPDATE, put(h::update)))
                .merge(guarded(MENU_DELETE, delete(h::delete))),
        )
}

/// User accounts
fn user_routes() -> Router<AppState> {
    use handlers::user as h;

    Router::new()
        .route(
            "/users",
            guarded(USER_READ, get(h::list)).merge(guarded(USER_CREATE, post(h::create))),
        )
        .route(
            "/users/batch-delete",
            guarded(USER_DELETE, post(h::batch_delete)),
        )
        .route(
            "/users/{id}",
            guarded(USER_READ, get(h::get))
                .merge(guarded(USER_UPDATE, put(h::update)))
                .merge(guarded(USER_DELETE, delete(h::delete))),
        )
        .route(
            "/users/{id}/roles",
            guarded(USER_UPDATE, put(h::assign_roles)),
        )
        .route(
            "/users/{id}/organizations",
            guarded(USER_UPDATE, put(h::assign_organizations)),
        )
        // Guarded in the handler: changing another user's password needs `user:update`.
        .route("/users/{id}/password", put(h::change_password))
}

/// Roles and grants
fn role_routes() -> Router<AppState> {
    use handlers::role as h;

    Router::new()
        .route(
            "/roles",
            guarded(ROLE_READ, get(h::list)).merge(guarded(ROLE_CREATE, post(h::create))),
        )
        .route(
            "/roles/{id}",
            guarded(ROLE_READ, get(h::get))
                .merge(guarded(ROLE_UPDATE, put(h::update)))
                .merge(guarded(ROLE_DELETE, delete(h::delete))),
        )
        .route(
            "/roles/{id}/menus",
            guarded(ROLE_READ, get(h::menus))
                .merge(guarded(ROLE_UPDATE, put(h::assign_menus))),
        )
        .route(
            "/roles/{id}/users",
            guarded(ROLE_UPDATE, put(h::assign_users)),
        )
}

/// Dictionaries
fn dict_routes() -> Router<AppState> {
    use handlers::dict as h;

    Router::new()
        .route(
            "/dicts",
            guarded(DICT_READ, get(h::list_types))
                .merge(guarded(DICT_CREATE, post(h::create_type))),
        )
        .route("/dicts/all-with-items", guarded(DICT_READ, get(h::all_with_items)))
        .route(
            "/dicts/{id}",
            guarded(DICT_READ, get(h::get_type))
                .merge(guarded(DICT_UPDATE, put(h::update_type)))
                .merge(guarded(DICT_DELETE, delete(h::delete_type))),
        )
        // The segment is a dictionary code here, not an id.
        .route(
            "/dicts/{id}/items",
            guarded(DICT_READ, get(h::items))
                .merge(guarded(DICT_CREATE, post(h::create_item))),
        )
        .route(
            "/dict-items/{id}",
            guarded(DICT_UPDATE, put(h::update_item))
                .merge(guarded(DICT_DELETE, delete(h::delete_item))),
        )
}

/// Access log
fn log_routes() -> Router<AppState> {
    Router::new().route(
        "/logs",
        guarded(LOG_READ, get(handlers::log::list))
            .merge(guarded(LOG_DELETE, delete(handlers::log::batch_delete))),
    )
}
