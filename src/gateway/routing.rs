//! Path-prefix routing table
//!
//! Each route maps a URL prefix to an upstream base URL or a directory on
//! disk. The longest matching prefix wins; a path no route claims goes to the
//! single-page application.

use std::path::{Path, PathBuf};

use url::Url;

use crate::config::{ConfigResult, ConfigurationError, GatewayConfig};

/// Where a route sends matching requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Forward to `base_url`, replacing the prefix with `rewrite_prefix` if set
    Upstream {
        base_url: String,
        rewrite_prefix: Option<String>,
    },
    /// Serve files from `root` with the prefix stripped
    StaticDir { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRoute {
    pub prefix: String,
    pub target: RouteTarget,
}

/// What to do with one request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Proxy { base_url: &'a str, path: String },
    Static { root: &'a Path, path: String },
    Spa,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<GatewayRoute>,
    spa_root: PathBuf,
    spa_index: String,
}

impl RouteTable {
    pub fn new(routes: Vec<GatewayRoute>, spa_root: impl Into<PathBuf>, spa_index: impl Into<String>) -> Self {
        let mut routes = routes;
        // Longest prefix first so the first match is the most specific
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            routes,
            spa_root: spa_root.into(),
            spa_index: spa_index.into(),
        }
    }

    /// Build the table from `[[gateway.routes]]`
    pub fn from_config(config: &GatewayConfig) -> ConfigResult<Self> {
        let mut routes = Vec::with_capacity(config.routes.len());

        for route in &config.routes {
            if !route.prefix.starts_with('/') {
                return Err(ConfigurationError::validation_error(format!(
                    "gateway route prefix '{}' must start with '/'",
                    route.prefix
                )));
            }
            if routes.iter().any(|r: &GatewayRoute| r.prefix == route.prefix) {
                return Err(ConfigurationError::validation_error(format!(
                    "gateway route prefix '{}' is declared twice",
                    route.prefix
                )));
            }

            let target = match (&route.upstream, &route.static_dir) {
                (Some(upstream), None) => {
                    let parsed = Url::parse(upstream).map_err(|e| {
                        ConfigurationError::validation_error(format!(
                            "gateway upstream '{upstream}' is not a valid URL: {e}"
                        ))
                    })?;
                    if !matches!(parsed.scheme(), "http" | "https") {
                        return Err(ConfigurationError::validation_error(format!(
                            "gateway upstream '{upstream}' must use http or https"
                        )));
                    }
                    if let Some(rewrite) = &route.rewrite {
                        if !rewrite.starts_with('/') {
                            return Err(ConfigurationError::validation_error(format!(
                                "gateway rewrite '{rewrite}' must start with '/'"
                            )));
                        }
                    }
                    RouteTarget::Upstream {
                        base_url: upstream.trim_end_matches('/').to_string(),
                        rewrite_prefix: route.rewrite.clone(),
                    }
                }
                (None, Some(dir)) => RouteTarget::StaticDir { root: dir.clone() },
                _ => {
                    return Err(ConfigurationError::validation_error(format!(
                        "gateway route '{}' needs exactly one of upstream or static_dir",
                        route.prefix
                    )))
                }
            };

            routes.push(GatewayRoute {
                prefix: route.prefix.clone(),
                target,
            });
        }

        Ok(Self::new(routes, &config.static_root, &config.index_file))
    }

    pub fn routes(&self) -> &[GatewayRoute] {
        &self.routes
    }

    pub fn spa_root(&self) -> &Path {
        &self.spa_root
    }

    pub fn spa_index(&self) -> &str {
        &self.spa_index
    }

    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let Some(route) = self.routes.iter().find(|r| path.starts_with(&r.prefix)) else {
            return Resolution::Spa;
        };
        let rest = &path[route.prefix.len()..];

        match &route.target {
            RouteTarget::Upstream {
                base_url,
                rewrite_prefix,
            } => {
                let prefix = rewrite_prefix.as_deref().unwrap_or(&route.prefix);
                Resolution::Proxy {
                    base_url,
                    path: format!("{prefix}{rest}"),
                }
            }
            RouteTarget::StaticDir { root } => Resolution::Static {
                root,
                path: format!("/{rest}"),
            },
        }
    }
}
