use crate::models::{Continuation, SearchPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Fetching(usize),
    Done,
}

/// Decides which page comes next for one target.
#[derive(Debug, Clone, Copy)]
pub struct PageCursor {
    cap: usize,
}

impl PageCursor {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn start(&self) -> PageState {
        if self.cap == 0 {
            PageState::Done
        } else {
            PageState::Fetching(0)
        }
    }

    pub fn advance(&self, page: usize, result: &SearchPage) -> PageState {
        let exhausted = match result.continuation {
            Continuation::Cursor { has_next } => !has_next,
            Continuation::UntilEmpty => result.vacancies.is_empty(),
        };
        if exhausted || page + 1 >= self.cap {
            PageState::Done
        } else {
            PageState::Fetching(page + 1)
        }
    }
}
