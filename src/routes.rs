//! Route table and router assembly.
//!
//! All routes are listed in one place at startup. Registering the same
//! method and path twice is a construction error rather than a silent override.

use axum::{
    handler::Handler,
    http::Method,
    middleware,
    routing::{on, MethodFilter},
    Router,
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::session::session_middleware;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Route {method} {path} is registered twice")]
    Duplicate { method: Method, path: String },

    #[error("Unsupported method {0} for routing")]
    UnsupportedMethod(Method),
}

/// Builder collecting `(method, path) -> handler` entries
pub struct RouteTable {
    router: Router<Arc<AppState>>,
    registered: HashSet<(Method, String)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            registered: HashSet::new(),
        }
    }

    pub fn add<H, T>(mut self, method: Method, path: &str, handler: H) -> Result<Self, RouteError>
    where
        H: Handler<T, Arc<AppState>>,
        T: 'static,
    {
        if !self.registered.insert((method.clone(), path.to_string())) {
            return Err(RouteError::Duplicate {
                method,
                path: path.to_string(),
            });
        }

        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RouteError::UnsupportedMethod(method))?;
        self.router = self.router.route(path, on(filter, handler));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn into_router(self) -> Router<Arc<AppState>> {
        self.router
    }
}

/// The API route table
pub fn route_table() -> Result<RouteTable, RouteError> {
    RouteTable::new()
        .add(Method::GET, "/status", api::status)?
        .add(Method::POST, "/new_game", api::new_game)?
        .add(Method::GET, "/game/{game_id}", api::get_game)?
        .add(Method::POST, "/game/{game_id}/join", api::join_game)?
        .add(Method::POST, "/game/{game_id}/new_round", api::new_round)?
        .add(
            Method::POST,
            "/game/{game_id}/round/{round_name}/new_poll",
            api::new_poll,
        )?
        .add(
            Method::POST,
            "/game/{game_id}/round/{round_name}/finalize",
            api::finalize_round,
        )?
        .add(
            Method::POST,
            "/game/{game_id}/round/{round_name}/vote",
            api::cast_vote,
        )
}

/// Assemble the application: API routes, sessions, static files, tracing
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, RouteError> {
    let table = route_table()?;
    tracing::debug!(routes = table.len(), "Route table built");

    let app = table
        .into_router()
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_is_complete() {
        let table = route_table().unwrap();
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let result = RouteTable::new()
            .add(Method::GET, "/status", api::status)
            .and_then(|t| t.add(Method::GET, "/status", api::status));

        match result {
            Err(RouteError::Duplicate { method, path }) => {
                assert_eq!(method, Method::GET);
                assert_eq!(path, "/status");
            }
            _ => panic!("Expected duplicate route error"),
        }
    }

    #[test]
    fn test_same_path_different_methods_allowed() {
        let table = RouteTable::new()
            .add(Method::GET, "/game/{game_id}", api::get_game)
            .and_then(|t| t.add(Method::POST, "/game/{game_id}", api::get_game))
            .unwrap();
        assert_eq!(table.len(), 2);
    }
}
