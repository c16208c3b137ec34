// src/config/cors.rs
//! Per-route cross-origin allow-lists.

use std::collections::HashMap;

use axum::http::{HeaderValue, Method};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed on every route without its own entry. "*" allows any.
    pub default: Vec<String>,
    /// Route path -> origins; replaces `default` for that route.
    pub routes: HashMap<String, Vec<String>>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            default: default_origins(),
            routes: HashMap::new(),
        }
    }
}

impl CorsConfig {
    pub fn origins_for(&self, route: &str) -> &[String] {
        self.routes
            .get(route)
            .map(Vec::as_slice)
            .unwrap_or(self.default.as_slice())
    }

    /// GET-only CORS layer for one route. An empty list grants no origin.
    pub fn layer_for(&self, route: &str) -> CorsLayer {
        let origins = self.origins_for(route);
        let base = CorsLayer::new().allow_methods([Method::GET]);

        if origins.iter().any(|o| o == "*") {
            return base.allow_origin(Any);
        }

        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(route, origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        base.allow_origin(AllowOrigin::list(values))
    }
}

/// Comma-separated list, trimmed, empties dropped.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
