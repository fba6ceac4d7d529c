/////////
/// Menu cursor and selection toggling
////////
use crate::catalog::{Catalog, Step};
use crate::selection::SelectionMap;

// Position in the menu: category, then step within that category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub category: usize,
    pub step: usize,
}

// Catalog plus the user's choices and where the cursor sits
#[derive(Debug, Clone)]
pub struct Menu {
    catalog: Catalog,
    selections: SelectionMap,
    cursor: Cursor,
}

impl Menu {
    // A validated catalog never has empty categories, so (0, 0) is in bounds
    pub fn new(catalog: Catalog) -> Self {
        let selections = SelectionMap::from_catalog(&catalog);
        Self {
            catalog,
            selections,
            cursor: Cursor::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selections(&self) -> &SelectionMap {
        &self.selections
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.catalog
            .categories
            .get(self.cursor.category)
            .and_then(|category| category.steps.get(self.cursor.step))
    }

    pub fn is_effectively_selected(&self, step: &Step) -> bool {
        step.required || self.selections.is_selected(&step.id)
    }

    fn steps_in(&self, category: usize) -> usize {
        self.catalog
            .categories
            .get(category)
            .map(|category| category.steps.len())
            .unwrap_or(0)
    }

    fn last_category(&self) -> usize {
        self.catalog.categories.len().saturating_sub(1)
    }

    pub fn move_down(&mut self) {
        if self.cursor.step + 1 < self.steps_in(self.cursor.category) {
            self.cursor.step += 1;
        } else if self.cursor.category < self.last_category() {
            self.cursor.category += 1;
            self.cursor.step = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.step > 0 {
            self.cursor.step -= 1;
        } else if self.cursor.category > 0 {
            self.cursor.category -= 1;
            self.cursor.step = self.steps_in(self.cursor.category).saturating_sub(1);
        }
    }

    pub fn move_category_forward(&mut self) {
        if self.cursor.category < self.last_category() {
            self.cursor.category += 1;
            self.cursor.step = 0;
        }
    }

    pub fn move_category_backward(&mut self) {
        if self.cursor.category > 0 {
            self.cursor.category -= 1;
            self.cursor.step = 0;
        }
    }

    // Flips the step under the cursor; required steps stay selected
    pub fn toggle_current(&mut self) {
        let Cursor { category, step } = self.cursor;
        let Some(step) = self.catalog.step_mut(category, step) else {
            return;
        };
        if step.required {
            return;
        }
        let value = !self.selections.is_selected(&step.id);
        self.selections.set(&step.id, value);
        step.selected = value;
    }
}
