use anyhow::Result;
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::domain::todo::{CreateToDo, ToDo, TodoId, UpdateToDo};
use crate::timeutil::parse_due;
use crate::usecase::todo_service::TodoService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing(TodoId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    All,
    DueToday,
    NextWeek,
    Done,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::All => View::DueToday,
            View::DueToday => View::NextWeek,
            View::NextWeek => View::Done,
            View::Done => View::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::All => "All",
            View::DueToday => "Due today",
            View::NextWeek => "Next 7 days",
            View::Done => "Done",
        }
    }
}

pub struct App<'a, I> {
    service: TodoService<'a, I>,
    pub todos: Vec<ToDo>,
    pub selected: usize,
    pub mode: InputMode,
    pub view: View,
    pub input: String,
    pub status: Option<String>,
}

impl<'a, I> App<'a, I>
where
    I: Iterator<Item = TodoId>,
{
    pub fn new(service: TodoService<'a, I>) -> Self {
        let mut app = Self {
            service,
            todos: Vec::new(),
            selected: 0,
            mode: InputMode::Normal,
            view: View::All,
            input: String::new(),
            status: None,
        };
        app.reload();
        app
    }

    /// Refresh the visible snapshot for the current view.
    pub fn reload(&mut self) {
        let now = OffsetDateTime::now_utc();
        let visible: Vec<&ToDo> = match self.view {
            View::All => self.service.get_to_dos().iter().collect(),
            View::DueToday => self.service.get_to_dos_by_date(now),
            View::NextWeek => self
                .service
                .get_to_dos_by_date_range(now, now + Duration::days(7)),
            View::Done => self.service.get_done_to_dos(),
        };
        self.todos = visible.into_iter().cloned().collect();
        if self.selected >= self.todos.len() && !self.todos.is_empty() {
            self.selected = self.todos.len() - 1;
        }
    }

    /// (open, all) across the whole list, not just the current view.
    pub fn totals(&self) -> (usize, usize) {
        let all = self.service.get_to_dos().len();
        let done = self.service.get_done_to_dos().len();
        (all - done, all)
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.selected = 0;
        self.reload();
        self.set_status(&format!("View: {}", self.view.label()));
    }

    pub fn select_next(&mut self) {
        if !self.todos.is_empty() {
            self.selected = (self.selected + 1).min(self.todos.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn selected_id(&self) -> Option<TodoId> {
        self.todos.get(self.selected).map(|t| t.id)
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.service.toggle_to_do_by_id(id);
            self.reload();
            self.set_status("Toggled completion");
        }
    }

    pub fn toggle_all(&mut self) {
        self.service.toggle_all_to_dos();
        self.reload();
        self.set_status("Toggled every task");
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.service.delete_to_do_by_id(id);
            if self.selected > 0 {
                self.selected -= 1;
            }
            self.reload();
            self.set_status("Deleted");
        }
    }

    pub fn delete_all(&mut self) {
        let (_, removed) = self.totals();
        self.service.delete_all_to_dos();
        self.selected = 0;
        self.reload();
        info!(removed, "cleared todo list");
        self.set_status(&format!("Deleted {removed} tasks"));
    }

    pub fn start_adding(&mut self) {
        self.mode = InputMode::Adding;
        self.input.clear();
        self.set_status("Type `name @ YYYY-MM-DD` and press Enter");
    }

    pub fn start_editing(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.input = self
            .service
            .get_to_do_by_id(id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        self.mode = InputMode::Editing(id);
        self.set_status("Edit the name, append `@ YYYY-MM-DD` to move the due date");
    }

    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
        self.set_status("Canceled");
    }

    pub fn submit_input(&mut self) {
        match self.mode {
            InputMode::Adding => self.add_todo(),
            InputMode::Editing(id) => self.apply_edit(id),
            InputMode::Normal => {}
        }
    }

    fn add_todo(&mut self) {
        let (name, due) = match parse_entry(&self.input) {
            Ok(entry) => entry,
            Err(err) => {
                self.set_status(&format!("{err:#}"));
                return;
            }
        };
        let Some(name) = name else {
            self.set_status("Cannot add an empty task");
            return;
        };

        let before = self.service.get_to_dos().len();
        let due = due.unwrap_or_else(OffsetDateTime::now_utc);
        self.service.add_to_do(CreateToDo::new(name, due));
        self.input.clear();
        self.mode = InputMode::Normal;
        self.reload();

        if self.service.get_to_dos().len() == before {
            self.set_status("A task with that name already exists");
            return;
        }
        let added = self.service.get_to_dos().last().map(|t| t.id);
        if let Some(pos) = self.todos.iter().position(|t| Some(t.id) == added) {
            self.selected = pos;
        }
        self.set_status("Added");
    }

    fn apply_edit(&mut self, id: TodoId) {
        let (name, due_date) = match parse_entry(&self.input) {
            Ok(entry) => entry,
            Err(err) => {
                self.set_status(&format!("{err:#}"));
                return;
            }
        };
        self.input.clear();
        self.mode = InputMode::Normal;
        if name.is_none() && due_date.is_none() {
            self.set_status("Nothing to change");
            return;
        }
        self.service
            .update_to_do_by_id(UpdateToDo { id, name, due_date });
        self.reload();
        self.set_status("Updated");
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }
}

/// Split `name @ due` input. Either side may be missing.
///
/// Only an `@` at the start or after whitespace separates the due date, so
/// names such as `mail bob@example.com` stay intact.
pub fn parse_entry(input: &str) -> Result<(Option<String>, Option<OffsetDateTime>)> {
    let (name, due) = match due_separator(input) {
        Some(pos) => (&input[..pos], Some(parse_due(&input[pos + 1..])?)),
        None => (input, None),
    };
    let name = name.trim();
    let name = (!name.is_empty()).then(|| name.to_owned());
    Ok((name, due))
}

fn due_separator(input: &str) -> Option<usize> {
    input
        .char_indices()
        .filter(|&(_, c)| c == '@')
        .map(|(pos, _)| pos)
        .filter(|&pos| {
            input[..pos]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace)
        })
        .last()
}
