use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use storage::models::Identity;

use crate::error::WebError;

/// Identity of the authenticated caller, placed in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Identity);

/// Rejects requests without a known bearer token.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    match api_keys.resolve(&req)? {
        Some(caller) => {
            req.extensions_mut().insert(caller);
            Ok(next.run(req).await)
        }
        None => Err(WebError::Unauthorized("Missing bearer token".to_string())),
    }
}

/// Admits anonymous requests, but still rejects unknown tokens.
pub async fn optional_auth(
    State(api_keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    if let Some(caller) = api_keys.resolve(&req)? {
        req.extensions_mut().insert(caller);
    }
    Ok(next.run(req).await)
}

/// Bearer tokens and the identities they authenticate.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashMap<String, Identity>>,
}

impl ApiKeys {
    /// Parses `identity:token` pairs separated by commas. Malformed entries
    /// are skipped.
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|entry| {
                let parsed = entry.split_once(':').and_then(|(identity, token)| {
                    let token = token.trim();
                    let identity = identity.parse::<Identity>().ok()?;
                    (!token.is_empty()).then(|| (token.to_string(), identity))
                });
                if parsed.is_none() {
                    tracing::warn!("Skipping malformed API key entry");
                }
                parsed
            })
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn identity(&self, token: &str) -> Option<&Identity> {
        self.keys.get(token)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn resolve(&self, req: &Request) -> Result<Option<Caller>, WebError> {
        let Some(header) = req.headers().get(AUTHORIZATION) else {
            return Ok(None);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| {
                WebError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".to_string(),
                )
            })?;

        match self.identity(token) {
            Some(identity) => Ok(Some(Caller(identity.clone()))),
            None => {
                tracing::warn!("Invalid API key attempt");
                Err(WebError::Unauthorized("Invalid API key".to_string()))
            }
        }
    }
}
