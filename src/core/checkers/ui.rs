//! Frontend route reachability and static asset presence.

use std::thread;

use serde_json::Value;

use crate::config::SweepConfig;
use crate::defaults::FrontendRoute;
use crate::http::HttpProbe;
use crate::report::Details;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub path: String,
    pub accessible: bool,
    pub details: Details,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticFileOutcome {
    pub name: String,
    pub exists: bool,
    pub details: Details,
}

pub struct UiChecker<'a> {
    config: &'a SweepConfig,
    http: &'a dyn HttpProbe,
}

impl<'a> UiChecker<'a> {
    pub fn new(config: &'a SweepConfig, http: &'a dyn HttpProbe) -> Self {
        Self { config, http }
    }

    /// Probe every configured route concurrently. `None` when `FRONTEND_URL`
    /// is not configured. Results keep the configured route order.
    pub fn check_routes(&self) -> Option<Vec<RouteOutcome>> {
        let base = self.config.frontend_url()?;
        let routes = &self.config.defaults.frontend_routes;

        let outcomes: Vec<RouteOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = routes
                .iter()
                .map(|route| scope.spawn(move || self.probe_route(base, route)))
                .collect();

            handles
                .into_iter()
                .zip(routes)
                .map(|(handle, route)| {
                    handle.join().unwrap_or_else(|_| {
                        failed_route(route, "Route probe thread panicked".to_string())
                    })
                })
                .collect()
        });

        Some(outcomes)
    }

    fn probe_route(&self, base: &str, route: &FrontendRoute) -> RouteOutcome {
        let url = format!("{}{}", base, route.path);
        match self.http.get(&url, None) {
            Ok(reply) => {
                let accessible = reply.is_ok();
                let mut details = Details::new();
                details.insert("name".to_string(), Value::String(route.name.clone()));
                details.insert("status_code".to_string(), Value::from(reply.status));
                details.insert("accessible".to_string(), Value::Bool(accessible));
                RouteOutcome {
                    path: route.path.clone(),
                    accessible,
                    details,
                }
            }
            Err(err) => failed_route(route, err.message),
        }
    }

    /// Static assets are looked up relative to the working directory.
    pub fn check_static_files(&self) -> Vec<StaticFileOutcome> {
        self.config
            .defaults
            .static_files
            .iter()
            .map(|name| {
                let exists = self.config.resolve(name).exists();
                let mut details = Details::new();
                details.insert("exists".to_string(), Value::Bool(exists));
                details.insert("path".to_string(), Value::String(name.clone()));
                StaticFileOutcome {
                    name: name.clone(),
                    exists,
                    details,
                }
            })
            .collect()
    }
}

fn failed_route(route: &FrontendRoute, error: String) -> RouteOutcome {
    let mut details = Details::new();
    details.insert("name".to_string(), Value::String(route.name.clone()));
    details.insert("error".to_string(), Value::String(error));
    details.insert("accessible".to_string(), Value::Bool(false));
    RouteOutcome {
        path: route.path.clone(),
        accessible: false,
        details,
    }
}
