//! Router builder for the bookshelf HTTP server

use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use bookshelf_kernel::ModuleRegistry;

/// Request ID generator: time-ordered UUIDs so request ids sort by arrival
#[derive(Clone, Copy)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Builder for constructing the main HTTP router.
///
/// Middleware layers wrap the routes present at the time they are added, so
/// callers register routes and module mounts before the `with_*` layers.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let mount_path = format!("/{}", module_name);
        self.router = self.router.nest(&mount_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; ids are set on the way in and echoed on
    /// the response
    pub fn with_request_id(mut self) -> Self {
        // Set must wrap Propagate, and `Router::layer` makes the last layer
        // the outermost one.
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let mut openapi_spec = serde_json::json!({
            "openapi": "3.0.0",
            "info": {
                "title": "Bookshelf API",
                "version": "1.0.0",
                "description": "In-memory bookshelf CRUD service"
            },
            "paths": {},
            "components": {
                "schemas": {}
            }
        });

        // Common envelope schema shared by every endpoint
        openapi_spec["components"]["schemas"]["Envelope"] = serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["success", "fail"]
                },
                "message": {
                    "type": "string"
                },
                "data": {
                    "type": "object"
                }
            },
            "required": ["status"]
        });

        openapi_spec["paths"]["/healthz"] = serde_json::json!({
            "get": {
                "summary": "Health check",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "text/plain": {
                                "schema": {
                                    "type": "string"
                                }
                            }
                        }
                    }
                }
            }
        });

        // Collect OpenAPI fragments from all modules
        for module in registry.modules() {
            if let Some(module_spec) = module.openapi() {
                if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
                    for (path, path_item) in paths {
                        // Prefix module paths with the module mount point
                        let prefixed_path = format!("/{}{}", module.name(), path.trim_end_matches('/'));
                        openapi_spec["paths"][prefixed_path] = path_item.clone();
                    }
                }

                if let Some(schemas) = module_spec
                    .get("components")
                    .and_then(|c| c.get("schemas"))
                    .and_then(|s| s.as_object())
                {
                    for (schema_name, schema_def) in schemas {
                        openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
                    }
                }
            }
        }

        // Deserialize the merged JSON into a utoipa OpenApi object so
        // SwaggerUI can serve it.
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|_| {
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Bookshelf API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON spec for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
