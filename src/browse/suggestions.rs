//! Suggestion dropdowns under the search inputs

use ratatui::layout::{Position, Rect};

/// Which search input a dropdown belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Movie,
    Actor,
}

/// Open/closed state of one dropdown plus the screen area it occupies
#[derive(Debug, Default)]
pub struct Dropdown {
    open: bool,
    focused: bool,
    bounds: Option<Rect>,
}

impl Dropdown {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Input gained focus; opens when there is something to pick
    pub fn focus(&mut self, candidates: usize) {
        self.focused = true;
        if candidates > 0 {
            self.open = true;
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Candidates arrived for the current text
    pub fn candidates_ready(&mut self, candidates: usize) {
        if self.focused && candidates > 0 {
            self.open = true;
        }
    }

    /// Area covering the input and its list, as last drawn
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Pointer pressed somewhere on screen; closes unless the press landed inside
    pub fn pointer_down(&mut self, at: Position) -> bool {
        if !self.open {
            return false;
        }
        let inside = self.bounds.is_some_and(|b| b.contains(at));
        if !inside {
            self.open = false;
        }
        !inside
    }
}
