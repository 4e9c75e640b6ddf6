// src/web/request_context.rs
use crate::config::Config;
use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{request::Parts, Method, Uri},
};
use std::{convert::Infallible, sync::Arc};

/// Dados do pedido atual usados em `meta_data.www`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    base_url: String,
    method: Method,
    uri: Uri,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>, method: Method, uri: Uri) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            method,
            uri,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Caminho sem a barra inicial (ex: "api/v1/users"); "/" para a raiz.
    pub fn path(&self) -> String {
        let trimmed = self.uri.path().trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// URL completa, incluindo a query string.
    pub fn full_url(&self) -> String {
        let path = self.uri.path().trim_end_matches('/');
        match self.uri.query() {
            Some(query) if !query.is_empty() => format!("{}{}?{}", self.base_url, path, query),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    /// Segmentos do caminho, já descodificados (ex: ["api", "v1", "users"]).
    pub fn segments(&self) -> Vec<String> {
        self.uri
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);
        // Em routers aninhados o `parts.uri` perde o prefixo
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        Ok(RequestContext::new(config.app_url.clone(), parts.method.clone(), uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(uri: &str) -> RequestContext {
        RequestContext::new("http://localhost:3000/", Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn path_sem_barra_inicial() {
        assert_eq!(ctx("/api/v1/users/column-names").path(), "api/v1/users/column-names");
        assert_eq!(ctx("/").path(), "/");
    }

    #[test]
    fn full_url_mantem_query_string() {
        assert_eq!(
            ctx("/api/v1/users?limit=10&page=2").full_url(),
            "http://localhost:3000/api/v1/users?limit=10&page=2"
        );
        assert_eq!(ctx("/api/health").full_url(), "http://localhost:3000/api/health");
    }

    #[test]
    fn segmentos_descodificados() {
        assert_eq!(
            ctx("/api/v1/contatos/Jo%C3%A3o").segments(),
            vec!["api", "v1", "contatos", "João"]
        );
        assert!(ctx("/").segments().is_empty());
    }
}
