use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type TodoId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDo {
    pub id: TodoId,
    pub name: String,
    pub done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
}

impl ToDo {
    pub fn new(id: TodoId, name: impl Into<String>, due_date: OffsetDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            done: false,
            created_at: OffsetDateTime::now_utc(),
            due_date,
        }
    }
}

/// Input of `TodoService::add_to_do`.
#[derive(Debug, Clone)]
pub struct CreateToDo {
    pub name: String,
    pub due_date: OffsetDateTime,
}

impl CreateToDo {
    pub fn new(name: impl Into<String>, due_date: OffsetDateTime) -> Self {
        Self {
            name: name.into(),
            due_date,
        }
    }
}

/// Input of `TodoService::update_to_do_by_id`. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateToDo {
    pub id: TodoId,
    pub name: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}
