use crate::auth::AuthSession;
use crate::router::{GuardOutcome, Location, NavigationIntent};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use metrics::counter;
use tower_sessions::Session;

/// Run every request through the route table and the navigation guard.
///
/// Redirect records and guard redirects answer `303 See Other`. Allowed
/// requests continue with the session's [`AuthState`](crate::auth::AuthState)
/// attached as a request extension.
pub async fn navigation_guard(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let to = Location::from(request.uri());
    let from = request
        .headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
        .map(|uri| Location::from(&uri));

    let resolved = state.routes.resolve(&to);
    let auth = AuthSession::load(&session).await;

    let intent = NavigationIntent::new(resolved.location.clone(), from);
    let outcome = state.guard.evaluate(intent, resolved.route, &auth);

    match outcome {
        GuardOutcome::Redirected(login) => {
            counter!("navigation_guard_outcomes_total", "outcome" => "redirected").increment(1);
            tracing::info!(
                to = %to,
                redirect = %login,
                "Navigation redirected to sign-in"
            );
            Redirect::to(&login.full_path()).into_response()
        }
        GuardOutcome::Allowed(target) if resolved.redirected => {
            counter!("navigation_guard_outcomes_total", "outcome" => "rewritten").increment(1);
            tracing::debug!(to = %to, target = %target, "Applied redirect route");
            Redirect::to(&target.full_path()).into_response()
        }
        GuardOutcome::Allowed(_) => {
            counter!("navigation_guard_outcomes_total", "outcome" => "allowed").increment(1);
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
    }
}
