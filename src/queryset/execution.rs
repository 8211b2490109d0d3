//! Memoized query results

use std::sync::Arc;

use crate::cursor::Cursor;

/// Items and continuation cursor of one execution
#[derive(Debug)]
pub struct Execution<M> {
    items: Vec<M>,
    next_cursor: Option<Cursor>,
    short_circuited: bool,
}

impl<M> Execution<M> {
    pub(crate) fn new(items: Vec<M>, next_cursor: Option<Cursor>) -> Self {
        Self {
            items,
            next_cursor,
            short_circuited: false,
        }
    }

    /// The empty result that never contacts the store
    pub(crate) fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            short_circuited: true,
        }
    }

    pub fn items(&self) -> &[M] {
        &self.items
    }

    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True for the empty sentinel
    pub fn is_short_circuited(&self) -> bool {
        self.short_circuited
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }
}

impl<'a, M> IntoIterator for &'a Execution<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Owning iterator over a shared execution, yielding clones
pub struct ExecutionIter<M> {
    execution: Arc<Execution<M>>,
    position: usize,
}

impl<M> ExecutionIter<M> {
    pub(crate) fn new(execution: Arc<Execution<M>>) -> Self {
        Self {
            execution,
            position: 0,
        }
    }
}

impl<M: Clone> Iterator for ExecutionIter<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        let item = self.execution.items.get(self.position)?.clone();
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.execution.items.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<M: Clone> ExactSizeIterator for ExecutionIter<M> {}
