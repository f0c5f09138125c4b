use time::OffsetDateTime;
use tracing::debug;

use crate::domain::id::IdGenerator;
use crate::domain::todo::{CreateToDo, ToDo, TodoId, UpdateToDo};
use crate::timeutil::same_day;

/// CRUD over a caller-owned list of todos.
///
/// The service borrows the list instead of copying it, so every change made
/// here is visible to the owner once the service is dropped. Lookups that miss
/// and duplicate names never fail; they leave the list untouched.
pub struct TodoService<'a, I = IdGenerator> {
    todos: &'a mut Vec<ToDo>,
    ids: I,
}

impl<'a, I> TodoService<'a, I>
where
    I: Iterator<Item = TodoId>,
{
    pub fn new(todos: &'a mut Vec<ToDo>, ids: I) -> Self {
        Self { todos, ids }
    }

    pub fn get_to_dos(&self) -> &[ToDo] {
        self.todos.as_slice()
    }

    pub fn get_to_do_by_id(&self, id: TodoId) -> Option<&ToDo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Todos due on the same calendar day as `date`; time of day is ignored.
    pub fn get_to_dos_by_date(&self, date: OffsetDateTime) -> Vec<&ToDo> {
        self.todos
            .iter()
            .filter(|t| same_day(t.due_date, date))
            .collect()
    }

    /// Todos due within `[start, end]`, both ends inclusive.
    pub fn get_to_dos_by_date_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Vec<&ToDo> {
        self.todos
            .iter()
            .filter(|t| t.due_date >= start && t.due_date <= end)
            .collect()
    }

    pub fn get_done_to_dos(&self) -> Vec<&ToDo> {
        self.todos.iter().filter(|t| t.done).collect()
    }

    pub fn add_to_do(&mut self, input: CreateToDo) {
        if self.todos.iter().any(|t| t.name == input.name) {
            debug!(name = %input.name, "todo with this name already exists; skipping");
            return;
        }
        // An exhausted id source degrades to 0 instead of failing.
        let id = self.ids.next().unwrap_or(0);
        debug!(id, name = %input.name, "adding todo");
        self.todos.push(ToDo::new(id, input.name, input.due_date));
    }

    pub fn update_to_do_by_id(&mut self, input: UpdateToDo) {
        let Some(todo) = self.find_mut(input.id) else {
            debug!(id = input.id, "update: no such todo");
            return;
        };
        if let Some(name) = input.name {
            todo.name = name;
        }
        if let Some(due_date) = input.due_date {
            todo.due_date = due_date;
        }
    }

    pub fn delete_to_do_by_id(&mut self, id: TodoId) {
        match self.todos.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.todos.remove(pos);
            }
            None => debug!(id, "delete: no such todo"),
        }
    }

    pub fn delete_all_to_dos(&mut self) {
        debug!(count = self.todos.len(), "deleting all todos");
        self.todos.clear();
    }

    pub fn toggle_to_do_by_id(&mut self, id: TodoId) {
        match self.find_mut(id) {
            Some(todo) => todo.done = !todo.done,
            None => debug!(id, "toggle: no such todo"),
        }
    }

    pub fn toggle_all_to_dos(&mut self) {
        for todo in self.todos.iter_mut() {
            todo.done = !todo.done;
        }
    }

    fn find_mut(&mut self, id: TodoId) -> Option<&mut ToDo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn service(todos: &mut Vec<ToDo>) -> TodoService<'_> {
        TodoService::new(todos, IdGenerator::new())
    }

    fn add(svc: &mut TodoService<'_>, name: &str, due: OffsetDateTime) {
        svc.add_to_do(CreateToDo::new(name, due));
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn add_creates_fresh_record() {
        let due = datetime!(2021-03-04 12:00 UTC);
        let mut todos = Vec::new();
        add(&mut service(&mut todos), "Test", due);

        assert_eq!(todos.len(), 1);
        let todo = &todos[0];
        assert_eq!(todo.id, 1);
        assert_eq!(todo.name, "Test");
        assert!(!todo.done);
        assert_eq!(todo.due_date, due);
        assert!(todo.created_at <= now());
    }

    #[test]
    fn add_skips_duplicate_name() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "Test", now());
        add(&mut svc, "Test", now());
        add(&mut svc, "test", now());
        drop(svc);

        assert_eq!(todos.len(), 2);
        // The skipped add did not consume an id.
        assert_eq!(todos[1].id, 2);
    }

    #[test]
    fn add_appends_to_prepopulated_list() {
        let mut todos = vec![ToDo::new(42, "existing", datetime!(2021-01-01 0:00 UTC))];
        let mut svc = service(&mut todos);
        add(&mut svc, "existing", now());
        add(&mut svc, "new", now());
        drop(svc);

        let ids: Vec<TodoId> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![42, 1]);
    }

    #[test]
    fn exhausted_id_source_falls_back_to_zero() {
        let mut todos = Vec::new();
        let mut svc = TodoService::new(&mut todos, std::iter::empty::<TodoId>());
        svc.add_to_do(CreateToDo::new("Test", now()));
        assert_eq!(svc.get_to_do_by_id(0).map(|t| t.name.as_str()), Some("Test"));
    }

    #[test]
    fn shared_generator_across_services() {
        let mut ids = IdGenerator::new();
        let mut first = Vec::new();
        let mut second = Vec::new();
        TodoService::new(&mut first, &mut ids).add_to_do(CreateToDo::new("a", now()));
        TodoService::new(&mut second, &mut ids).add_to_do(CreateToDo::new("b", now()));
        assert_eq!(first[0].id, 1);
        assert_eq!(second[0].id, 2);
    }

    #[test]
    fn get_to_dos_in_insertion_order() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        assert!(svc.get_to_dos().is_empty());
        add(&mut svc, "Test", now());
        add(&mut svc, "Test 2", now());
        let names: Vec<&str> = svc.get_to_dos().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Test", "Test 2"]);
    }

    #[test]
    fn get_by_id() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        assert!(svc.get_to_do_by_id(1).is_none());
        add(&mut svc, "Test", now());
        let todo = svc.get_to_do_by_id(1).unwrap();
        assert_eq!(todo.name, "Test");
        assert!(!todo.done);
    }

    #[test]
    fn by_date_matches_calendar_day() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        assert!(svc.get_to_dos_by_date(datetime!(2021-01-01 0:00 UTC)).is_empty());
        add(&mut svc, "Test", datetime!(2021-01-01 0:00 UTC));
        add(&mut svc, "Test 2", datetime!(2021-01-01 18:45 UTC));
        add(&mut svc, "Test 3", datetime!(2021-01-02 0:00 UTC));

        let found = svc.get_to_dos_by_date(datetime!(2021-01-01 9:00 UTC));
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.name != "Test 3"));
    }

    #[test]
    fn by_date_skips_due_dates_that_cannot_shift() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "far future", datetime!(9999-12-31 23:30 UTC));
        add(&mut svc, "new year", datetime!(2021-01-01 10:00 +1));

        let found = svc.get_to_dos_by_date(datetime!(2021-01-01 0:00 +1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "new year");
    }

    #[test]
    fn by_date_range_is_inclusive() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        let start = datetime!(2021-01-01 0:00 UTC);
        let end = datetime!(2021-01-02 0:00 UTC);
        assert!(svc.get_to_dos_by_date_range(start, end).is_empty());
        add(&mut svc, "Test", datetime!(2021-01-01 0:00 UTC));
        add(&mut svc, "Test 2", datetime!(2021-01-01 0:00 UTC));
        add(&mut svc, "Test 3", datetime!(2021-01-02 0:00 UTC));
        add(&mut svc, "Test 4", datetime!(2021-01-05 0:00 UTC));

        assert_eq!(svc.get_to_dos_by_date_range(start, end).len(), 3);
    }

    #[test]
    fn by_date_range_compares_full_timestamps() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "late", datetime!(2021-01-02 10:00 UTC));
        let found = svc.get_to_dos_by_date_range(
            datetime!(2021-01-01 0:00 UTC),
            datetime!(2021-01-02 0:00 UTC),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn done_filter() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "a", now());
        add(&mut svc, "b", now());
        svc.toggle_to_do_by_id(2);
        let done: Vec<TodoId> = svc.get_done_to_dos().iter().map(|t| t.id).collect();
        assert_eq!(done, vec![2]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let due = datetime!(2021-01-01 0:00 UTC);
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "Test", due);
        let before = svc.get_to_do_by_id(1).unwrap().clone();

        svc.update_to_do_by_id(UpdateToDo {
            id: 1,
            name: Some("Test 2".into()),
            ..Default::default()
        });
        let after = svc.get_to_do_by_id(1).unwrap();
        assert_eq!(after.name, "Test 2");
        assert_eq!(after.due_date, due);
        assert_eq!(after.done, before.done);
        assert_eq!(after.created_at, before.created_at);

        let new_due = datetime!(2022-06-01 8:00 UTC);
        svc.update_to_do_by_id(UpdateToDo {
            id: 1,
            due_date: Some(new_due),
            ..Default::default()
        });
        let after = svc.get_to_do_by_id(1).unwrap();
        assert_eq!(after.name, "Test 2");
        assert_eq!(after.due_date, new_due);
    }

    #[test]
    fn update_keeps_position_and_allows_name_clash() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "a", now());
        add(&mut svc, "b", now());
        add(&mut svc, "c", now());
        svc.update_to_do_by_id(UpdateToDo {
            id: 2,
            name: Some("a".into()),
            ..Default::default()
        });
        drop(svc);

        let names: Vec<&str> = todos.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a", "c"]);
    }

    #[test]
    fn update_missing_is_noop() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        svc.update_to_do_by_id(UpdateToDo {
            id: 1,
            name: Some("Test 2".into()),
            ..Default::default()
        });
        assert!(svc.get_to_do_by_id(1).is_none());

        add(&mut svc, "Test", now());
        let before = svc.get_to_dos().to_vec();
        svc.update_to_do_by_id(UpdateToDo {
            id: 7,
            name: Some("other".into()),
            ..Default::default()
        });
        assert_eq!(svc.get_to_dos(), before.as_slice());
    }

    #[test]
    fn delete_removes_one_and_keeps_order() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "a", now());
        add(&mut svc, "b", now());
        add(&mut svc, "c", now());
        svc.delete_to_do_by_id(2);
        assert!(svc.get_to_do_by_id(2).is_none());
        drop(svc);

        let ids: Vec<TodoId> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn delete_missing_is_noop() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        svc.delete_to_do_by_id(1);
        assert!(svc.get_to_dos().is_empty());
        add(&mut svc, "a", now());
        svc.delete_to_do_by_id(9);
        assert_eq!(svc.get_to_dos().len(), 1);
    }

    #[test]
    fn delete_all() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        svc.delete_all_to_dos();
        assert!(svc.get_to_dos().is_empty());
        add(&mut svc, "Test", now());
        add(&mut svc, "Test 2", now());
        svc.delete_all_to_dos();
        drop(svc);
        assert!(todos.is_empty());
    }

    #[test]
    fn toggle_flips_and_restores() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "Test", now());
        svc.toggle_to_do_by_id(1);
        assert!(svc.get_to_do_by_id(1).unwrap().done);
        svc.toggle_to_do_by_id(1);
        assert!(!svc.get_to_do_by_id(1).unwrap().done);
    }

    #[test]
    fn toggle_missing_is_noop() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        svc.toggle_to_do_by_id(1);
        assert!(svc.get_to_do_by_id(1).is_none());
    }

    #[test]
    fn toggle_all_flips_each_record() {
        let mut todos = Vec::new();
        let mut svc = service(&mut todos);
        add(&mut svc, "Test", now());
        add(&mut svc, "Test 2", now());
        add(&mut svc, "Test 3", now());
        svc.toggle_to_do_by_id(3);

        svc.toggle_all_to_dos();
        let done: Vec<bool> = svc.get_to_dos().iter().map(|t| t.done).collect();
        assert_eq!(done, vec![true, true, false]);

        svc.toggle_all_to_dos();
        let done: Vec<bool> = svc.get_to_dos().iter().map(|t| t.done).collect();
        assert_eq!(done, vec![false, false, true]);
    }
}
