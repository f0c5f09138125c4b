use super::todo::TodoId;

/// Endless source of todo ids: 1, 2, 3, ...
///
/// Every instance counts on its own, so two fresh generators both start at 1.
#[derive(Debug)]
pub struct IdGenerator {
    next: TodoId,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for IdGenerator {
    type Item = TodoId;

    fn next(&mut self) -> Option<TodoId> {
        let id = self.next;
        // Saturates at the end of the range so the sequence never stops.
        self.next = self.next.saturating_add(1);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
