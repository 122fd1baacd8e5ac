/**
 * API Route Handlers
 *
 * Routes of the `/api/v1` surface and the gate each one sits behind.
 *
 * # Routes
 *
 * ## Public
 * - `POST /login` - Password login, returns a token pair
 * - `POST /refresh` - Refresh token for a new access token
 * - `POST /register-force` - Open registration (only when enabled)
 *
 * ## Any valid access token
 * - `GET /users` - Paginated search
 * - `GET /users/{id}` - One user
 * - `GET /profile` - The caller's own record
 * - `PUT /profile/password` - Change password (handler also requires a
 *   fresh token)
 *
 * ## ADMIN
 * - `POST /register` - Create a user
 * - `PUT /users/{id}` - Edit a user
 * - `DELETE /users/{id}` - Delete a user other than the caller
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::backend::auth::handlers::{
    change_password, delete_user, edit_user, find_users, get_profile, get_user, login, refresh,
    register, register_force,
};
use crate::backend::middleware::{auth_middleware, RoleGate};
use crate::backend::server::state::AppState;
use crate::shared::Role;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `app_state` - Supplies the token codec for the gates and the
///   open-registration switch
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let authenticated = RoleGate::authenticated(app_state.codec.clone());
    let admin = RoleGate::requiring(app_state.codec.clone(), &[Role::Admin]);

    let router = router
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", gated(post(register), &admin))
        .route("/users", gated(get(find_users), &authenticated))
        .route(
            "/users/{id}",
            gated(get(get_user), &authenticated)
                .merge(gated(put(edit_user).delete(delete_user), &admin)),
        )
        .route("/profile", gated(get(get_profile), &authenticated))
        .route("/profile/password", gated(put(change_password), &authenticated));

    if app_state.config.open_registration {
        router.route("/register-force", post(register_force))
    } else {
        router
    }
}

/// Put a method router behind a gate
///
/// Route layers only run for matched methods, so an unsupported method still
/// gets 405 rather than 401.
fn gated(route: MethodRouter<AppState>, gate: &RoleGate) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(gate.clone(), auth_middleware))
}
