use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub is_complete: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub is_complete: Option<bool>,
}

/// Todos in creation order.
pub type Db = Arc<RwLock<Vec<Todo>>>;

type Rejection = (StatusCode, String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    Json(todos.clone())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), Rejection> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;
    validate_due_date(&input.due_date)?;
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        due_date: input.due_date,
        is_complete: false,
    };
    db.write().await.push(todo.clone());
    info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, Rejection> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(due_date) = &input.due_date {
        validate_due_date(due_date)?;
    }

    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no todo {id}")))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(due_date) = input.due_date {
        todo.due_date = due_date;
    }
    if let Some(is_complete) = input.is_complete {
        todo.is_complete = is_complete;
    }
    info!(%id, is_complete = todo.is_complete, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = db.write().await;
    let index = todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    todos.remove(index);
    info!(%id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_title(title: &str) -> Result<(), Rejection> {
    validate_text("title", title, TITLE_MAX_CHARS)
}

fn validate_description(description: &str) -> Result<(), Rejection> {
    validate_text("description", description, DESCRIPTION_MAX_CHARS)
}

fn validate_text(field: &str, value: &str, max_chars: usize) -> Result<(), Rejection> {
    if value.trim().is_empty() {
        return Err(unprocessable(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(unprocessable(format!("{field} must be at most {max_chars} characters")));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` with a plausible month and day. Calendar validity
/// beyond that (Feb 30) is not checked.
fn validate_due_date(due_date: &str) -> Result<(), Rejection> {
    let bytes = due_date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    let in_range = shape_ok && {
        let month: u32 = due_date[5..7].parse().unwrap_or(0);
        let day: u32 = due_date[8..10].parse().unwrap_or(0);
        (1..=12).contains(&month) && (1..=31).contains(&day)
    };
    if in_range {
        Ok(())
    } else {
        Err(unprocessable(format!("due_date `{due_date}` is not a YYYY-MM-DD date")))
    }
}

fn unprocessable(message: String) -> Rejection {
    (StatusCode::UNPROCESSABLE_ENTITY, message)
}
