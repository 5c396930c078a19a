pub mod models;
pub mod repo;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shelf_db::Db;
use shelf_http::error::AppError;
use shelf_kernel::{InitCtx, Migration, Module};

use models::{Book, BookCreate, BookPatch, Message};
use repo::BookRepo;

const BOOK_NOT_FOUND: &str = "This book is not found.";

/// Books module: CRUD over the single `books` table
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
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

    fn routes(&self, db: Db) -> Router {
        Router::new()
            .route("/books", get(list_books))
            .route("/book", post(create_book))
            .route(
                "/book/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(db)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All persisted books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {
                                                "$ref": "#/components/schemas/Book"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/book": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/BookIn"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The created book, including its assigned id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error"
                            }
                        }
                    }
                },
                "/book/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The requested book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book has that id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/HTTPNotFoundError"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Partially update a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/BookPatch"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The book after applying the supplied fields",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book has that id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/HTTPNotFoundError"
                                        }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error"
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Deletion confirmation",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Message"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book has that id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/HTTPNotFoundError"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "description": "Store-assigned identifier"
                            },
                            "title": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "author": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "price": {
                                "type": "integer"
                            },
                            "description": {
                                "type": "string",
                                "nullable": true
                            }
                        },
                        "required": ["id", "title", "author", "price"]
                    },
                    "BookIn": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "author": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "price": {
                                "type": "integer"
                            },
                            "description": {
                                "type": "string",
                                "nullable": true
                            }
                        },
                        "required": ["title", "author", "price"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "author": {
                                "type": "string",
                                "maxLength": 255
                            },
                            "price": {
                                "type": "integer"
                            },
                            "description": {
                                "type": "string",
                                "nullable": true
                            }
                        }
                    },
                    "Message": {
                        "type": "object",
                        "properties": {
                            "message": {
                                "type": "string"
                            }
                        },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    title       VARCHAR(255) NOT NULL,
                    author      VARCHAR(255) NOT NULL,
                    price       INTEGER NOT NULL,
                    description TEXT
                )
                "#,
        }]
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

/// `GET /books`
async fn list_books(State(db): State<Db>) -> Result<Json<Vec<Book>>, AppError> {
    let books = BookRepo::list(&db).await.map_err(AppError::store)?;
    Ok(Json(books))
}

/// `POST /book`
async fn create_book(
    State(db): State<Db>,
    Json(input): Json<BookCreate>,
) -> Result<Json<Book>, AppError> {
    input
        .validate()
        .map_err(|details| AppError::validation(details, "book payload failed validation"))?;

    let book = BookRepo::create(&db, &input).await.map_err(AppError::store)?;
    Ok(Json(book))
}

/// `GET /book/{id}`
async fn get_book(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Book>, AppError> {
    BookRepo::find_by_id(&db, id)
        .await
        .map_err(AppError::store)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
}

/// `PUT /book/{id}`
async fn update_book(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, AppError> {
    patch
        .validate()
        .map_err(|details| AppError::validation(details, "book patch failed validation"))?;

    BookRepo::update(&db, id, &patch)
        .await
        .map_err(AppError::store)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
}

/// `DELETE /book/{id}`
async fn delete_book(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, AppError> {
    let deleted = BookRepo::delete(&db, id).await.map_err(AppError::store)?;
    if !deleted {
        return Err(AppError::not_found(BOOK_NOT_FOUND));
    }
    Ok(Json(Message {
        message: "Successfully Deleted".to_string(),
    }))
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
