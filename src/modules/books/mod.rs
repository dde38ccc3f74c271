pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;

use bookshelf_kernel::{InitCtx, Module};
use store::BookStore;

/// Books module: in-memory CRUD over book records.
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new() -> Self {
        Self {
            store: Arc::new(BookStore::new()),
        }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "name",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Case-insensitive substring match on the book name"
                            },
                            {
                                "name": "reading",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string", "enum": ["0", "1"] }
                            },
                            {
                                "name": "finished",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string", "enum": ["0", "1"] }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Book summaries in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Book created; data carries the new bookId",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing name or readPage greater than pageCount",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Full book record",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book with the given id",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Book updated" },
                            "400": { "description": "Validation failed" },
                            "404": { "description": "No book with the given id" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": { "description": "Book deleted" },
                            "404": { "description": "No book with the given id" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "year": { "type": "integer" },
                            "author": { "type": "string" },
                            "summary": { "type": "string" },
                            "publisher": { "type": "string" },
                            "pageCount": { "type": "integer", "minimum": 0 },
                            "readPage": { "type": "integer", "minimum": 0 },
                            "finished": { "type": "boolean" },
                            "reading": { "type": "boolean" },
                            "insertedAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "name", "pageCount", "readPage", "finished", "reading", "insertedAt", "updatedAt"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "year": { "type": "integer" },
                            "author": { "type": "string" },
                            "summary": { "type": "string" },
                            "publisher": { "type": "string" },
                            "pageCount": { "type": "integer", "minimum": 0 },
                            "readPage": { "type": "integer", "minimum": 0 },
                            "reading": { "type": "boolean" }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
