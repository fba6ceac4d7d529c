use std::collections::HashMap;

use crate::catalog::Catalog;

// Which steps the user wants, keyed by step id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
    selected: HashMap<String, bool>,
}

impl SelectionMap {
    // Seeds the map from the catalog defaults
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let selected = catalog
            .steps()
            .map(|step| (step.id.clone(), step.selected || step.required))
            .collect();
        Self { selected }
    }

    // Unknown ids read as unselected
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: &str, value: bool) {
        self.selected.insert(id.to_string(), value);
    }

    pub fn selected_count(&self) -> usize {
        self.selected.values().filter(|flag| **flag).count()
    }
}
