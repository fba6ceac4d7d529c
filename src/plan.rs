use crate::catalog::Catalog;
use crate::selection::SelectionMap;

// Ordered step ids to run, frozen once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    ids: Vec<String>,
}

impl ExecutionPlan {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// Catalog order decides plan order, never the order things were toggled in
pub fn build_plan(catalog: &Catalog, selections: &SelectionMap) -> ExecutionPlan {
    let ids = catalog
        .steps()
        .filter(|step| step.required || selections.is_selected(&step.id))
        .map(|step| step.id.clone())
        .collect();
    ExecutionPlan { ids }
}
