use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::AppState;

/// RouteClass
///
/// The access class of a request path, derived at evaluation time from the
/// static route tables. Every path falls into exactly one class; anything
/// not explicitly listed as public is `Protected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Page routes reachable without a session (landing, auth pages, dashboard).
    PublicPage,
    /// API routes reachable without a session.
    PublicApi,
    /// Everything else. Requires a resolved user id.
    Protected,
}

/// Decision
///
/// The gate's verdict for a single request. Computed fresh per request from
/// `(path, user_id)` and the route tables; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request continue to its normal handler.
    PassThrough,
    /// Short-circuit with an HTTP redirect to the given path.
    Redirect(String),
}

/// RouteTables
///
/// The gate's immutable classification configuration. Kept as an explicit
/// value on the application state (rather than module-level statics) so tests
/// can evaluate the gate against alternate tables deterministically.
///
/// Matching is exact string equality against the listed paths; there are no
/// wildcard or prefix semantics beyond what the lists enumerate.
#[derive(Debug, Clone)]
pub struct RouteTables {
    /// Pages reachable without a session.
    pub public_pages: Vec<String>,
    /// API paths reachable without a session.
    pub public_apis: Vec<String>,
    /// The signed-in landing page. Doubles as the bounce target for signed-in
    /// users visiting other public pages, and is itself exempt from that
    /// bounce so the redirect cannot loop.
    pub dashboard: String,
    /// Redirect target for signed-out users on gated paths.
    pub sign_in: String,
}

impl Default for RouteTables {
    fn default() -> Self {
        Self {
            public_pages: ["/sign-in", "/sign-up", "/", "/home"]
                .map(String::from)
                .to_vec(),
            public_apis: vec!["/api/videos".to_string()],
            dashboard: "/home".to_string(),
            sign_in: "/sign-in".to_string(),
        }
    }
}

impl RouteTables {
    pub fn is_public_page(&self, path: &str) -> bool {
        self.public_pages.iter().any(|p| p == path)
    }

    pub fn is_public_api(&self, path: &str) -> bool {
        self.public_apis.iter().any(|p| p == path)
    }

    /// classify
    ///
    /// Total classification of a path into its `RouteClass`. A path listed in
    /// both tables classifies as `PublicPage`; `evaluate` re-checks API
    /// membership where the distinction matters.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public_page(path) {
            RouteClass::PublicPage
        } else if self.is_public_api(path) {
            RouteClass::PublicApi
        } else {
            RouteClass::Protected
        }
    }
}

/// evaluate
///
/// The access decision itself: a pure function of `(path, user_id, tables)`.
/// No state carries across calls, so evaluating twice with identical inputs
/// yields identical decisions.
///
/// Rule order matters on overlapping cases:
/// 1. A signed-in user on a public page (other than the dashboard) is bounced
///    to the dashboard. The dashboard is exempt even though it is listed as a
///    public page, otherwise `/home` would redirect to itself.
/// 2. A signed-out user on a path that is neither a public page nor a public
///    API is sent to sign-in.
/// 3. A signed-out user on a non-public `/api` path is sent to sign-in. Under
///    the default tables every path reaching this rule has already passed
///    rule 2, so the rule only bites when a table lists an `/api` path as a
///    public page; it is kept as its own rule rather than folded into rule 2
///    so API gating stays explicit.
/// 4. Anything else passes through.
pub fn evaluate(path: &str, user_id: Option<&str>, tables: &RouteTables) -> Decision {
    let is_dashboard = path == tables.dashboard;
    let class = tables.classify(path);

    if user_id.is_some() {
        return match class {
            RouteClass::PublicPage if !is_dashboard => Decision::Redirect(tables.dashboard.clone()),
            RouteClass::PublicPage | RouteClass::PublicApi | RouteClass::Protected => {
                Decision::PassThrough
            }
        };
    }

    match class {
        RouteClass::Protected => Decision::Redirect(tables.sign_in.clone()),
        RouteClass::PublicPage | RouteClass::PublicApi => {
            if path.starts_with("/api") && !tables.is_public_api(path) {
                Decision::Redirect(tables.sign_in.clone())
            } else {
                Decision::PassThrough
            }
        }
    }
}

/// in_scope
///
/// The gate's request matcher. `/` and everything under `/api` and `/trpc`
/// are always evaluated; static assets (any path containing a `.`) and
/// framework-reserved `/_`-prefixed paths are skipped; every other path is
/// evaluated.
pub fn in_scope(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if path.starts_with("/api/") || path == "/api" || path.starts_with("/trpc/") || path == "/trpc"
    {
        return true;
    }
    if path.contains('.') {
        return false;
    }
    if path.starts_with("/_") {
        return false;
    }
    true
}

/// access_gate
///
/// The middleware wiring around `evaluate`. Runs before every page and API
/// handler: resolves the caller's session via the Identity Provider, computes
/// the decision, and either forwards the request or answers with a 307
/// redirect.
///
/// Session resolution is owned entirely by the Identity collaborator; a hard
/// resolution failure (malformed or forged session material) is surfaced as
/// 401 rather than treated as signed-out.
pub async fn access_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if !in_scope(&path) {
        return next.run(request).await;
    }

    let user_id = match state.identity.resolve_session(request.headers()).await {
        Ok(id) => id,
        Err(status) => {
            tracing::warn!(path = %path, "session resolution failed, rejecting request");
            return status.into_response();
        }
    };

    match evaluate(&path, user_id.as_deref(), &state.route_tables) {
        Decision::PassThrough => next.run(request).await,
        Decision::Redirect(target) => {
            tracing::debug!(path = %path, target = %target, signed_in = user_id.is_some(), "gate redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> RouteTables {
        RouteTables::default()
    }

    #[test]
    fn signed_in_user_on_auth_page_bounces_to_dashboard() {
        assert_eq!(
            evaluate("/sign-in", Some("u1"), &tables()),
            Decision::Redirect("/home".to_string())
        );
        assert_eq!(
            evaluate("/sign-up", Some("u1"), &tables()),
            Decision::Redirect("/home".to_string())
        );
        assert_eq!(
            evaluate("/", Some("u1"), &tables()),
            Decision::Redirect("/home".to_string())
        );
    }

    #[test]
    fn dashboard_is_exempt_from_the_signed_in_bounce() {
        // "/home" is itself a public page; without the exemption this would loop.
        assert_eq!(evaluate("/home", Some("u1"), &tables()), Decision::PassThrough);
    }

    #[test]
    fn signed_out_user_on_protected_page_goes_to_sign_in() {
        assert_eq!(
            evaluate("/video-upload", None, &tables()),
            Decision::Redirect("/sign-in".to_string())
        );
        assert_eq!(
            evaluate("/social-share", None, &tables()),
            Decision::Redirect("/sign-in".to_string())
        );
    }

    #[test]
    fn public_api_is_reachable_signed_out() {
        assert_eq!(evaluate("/api/videos", None, &tables()), Decision::PassThrough);
    }

    #[test]
    fn non_public_api_is_gated_signed_out() {
        assert_eq!(
            evaluate("/api/video-upload", None, &tables()),
            Decision::Redirect("/sign-in".to_string())
        );
        assert_eq!(
            evaluate("/api/image-upload", None, &tables()),
            Decision::Redirect("/sign-in".to_string())
        );
    }

    #[test]
    fn signed_in_user_passes_protected_routes() {
        assert_eq!(
            evaluate("/video-upload", Some("u1"), &tables()),
            Decision::PassThrough
        );
        assert_eq!(
            evaluate("/api/video-upload", Some("u1"), &tables()),
            Decision::PassThrough
        );
    }

    #[test]
    fn signed_out_user_passes_public_pages() {
        assert_eq!(evaluate("/", None, &tables()), Decision::PassThrough);
        assert_eq!(evaluate("/sign-in", None, &tables()), Decision::PassThrough);
        assert_eq!(evaluate("/home", None, &tables()), Decision::PassThrough);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let t = tables();
        for (path, user) in [
            ("/sign-in", Some("u1")),
            ("/video-upload", None),
            ("/api/videos", None),
            ("/home", Some("u1")),
        ] {
            assert_eq!(evaluate(path, user, &t), evaluate(path, user, &t));
        }
    }

    #[test]
    fn classification_is_total_and_exact() {
        let t = tables();
        assert_eq!(t.classify("/sign-in"), RouteClass::PublicPage);
        assert_eq!(t.classify("/api/videos"), RouteClass::PublicApi);
        assert_eq!(t.classify("/api/videos/extra"), RouteClass::Protected);
        // Exact-match only: no prefix semantics.
        assert_eq!(t.classify("/sign-in/"), RouteClass::Protected);
        assert_eq!(t.classify("/anything-else"), RouteClass::Protected);
    }

    #[test]
    fn api_rule_bites_when_an_api_path_is_listed_as_a_public_page() {
        // A table that (mis)lists an /api path under public pages: the page
        // rule alone would let it through, but the API rule still gates it.
        let t = RouteTables {
            public_pages: vec!["/".to_string(), "/api/secret".to_string()],
            public_apis: vec![],
            dashboard: "/home".to_string(),
            sign_in: "/sign-in".to_string(),
        };
        assert_eq!(
            evaluate("/api/secret", None, &t),
            Decision::Redirect("/sign-in".to_string())
        );
    }

    #[test]
    fn alternate_tables_are_honored() {
        let t = RouteTables {
            public_pages: vec!["/welcome".to_string(), "/app".to_string()],
            public_apis: vec!["/api/ping".to_string()],
            dashboard: "/app".to_string(),
            sign_in: "/welcome".to_string(),
        };
        assert_eq!(
            evaluate("/welcome", Some("u1"), &t),
            Decision::Redirect("/app".to_string())
        );
        assert_eq!(evaluate("/app", Some("u1"), &t), Decision::PassThrough);
        assert_eq!(
            evaluate("/home", None, &t),
            Decision::Redirect("/welcome".to_string())
        );
        assert_eq!(evaluate("/api/ping", None, &t), Decision::PassThrough);
    }

    #[test]
    fn matcher_covers_root_api_and_trpc() {
        assert!(in_scope("/"));
        assert!(in_scope("/api"));
        assert!(in_scope("/api/videos"));
        assert!(in_scope("/trpc"));
        assert!(in_scope("/trpc/videos.list"));
        assert!(in_scope("/video-upload"));
        assert!(in_scope("/home"));
    }

    #[test]
    fn matcher_skips_assets_and_reserved_paths() {
        assert!(!in_scope("/favicon.ico"));
        assert!(!in_scope("/static/app.js"));
        assert!(!in_scope("/_internal/health"));
        assert!(!in_scope("/_buildinfo"));
    }
}
