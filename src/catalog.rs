/////////
/// Step catalog
////////
use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CatalogError;

const EMBEDDED_CATALOG: &str = include_str!("../catalog.toml");

// Single installable component
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub id: String,          // Shell function invoked by the install script
    pub name: String,        // The name displayed in the UI and in step markers
    pub description: String, // One-line help shown under the cursor
    #[serde(default)]
    pub selected: bool, // Default selection, then mirrors the selection map
    #[serde(default)]
    pub required: bool, // Always installed, cannot be toggled
}

// Named group of steps, shown as one section of the menu
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub steps: Vec<Step>,
}

// Shell libraries and hooks wrapped around the selected steps
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ScriptConfig {
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub script: ScriptConfig,
    pub categories: Vec<Category>,
}

impl Catalog {
    // The catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = toml::from_str(raw)?;
        validate_catalog(&catalog)?;
        // Required steps are always effectively selected
        for step in catalog.steps_mut() {
            if step.required {
                step.selected = true;
            }
        }
        Ok(catalog)
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.categories.iter().flat_map(|category| category.steps.iter())
    }

    fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.categories
            .iter_mut()
            .flat_map(|category| category.steps.iter_mut())
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps().find(|step| step.id == id)
    }

    pub(crate) fn step_mut(&mut self, category: usize, step: usize) -> Option<&mut Step> {
        self.categories
            .get_mut(category)
            .and_then(|category| category.steps.get_mut(step))
    }

    pub fn total_count(&self) -> usize {
        self.steps().count()
    }
}

fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    if catalog.categories.is_empty() {
        return Err(CatalogError::NoCategories);
    }

    let mut seen = HashSet::new();
    for (idx, category) in catalog.categories.iter().enumerate() {
        if category.name.trim().is_empty() {
            return Err(CatalogError::EmptyCategoryName(idx));
        }
        if category.steps.is_empty() {
            return Err(CatalogError::EmptyCategory(category.name.clone()));
        }
        for step in &category.steps {
            if !is_shell_identifier(&step.id) {
                return Err(CatalogError::InvalidStepId(step.id.clone()));
            }
            if step.name.trim().is_empty() {
                return Err(CatalogError::EmptyStepName(step.id.clone()));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStepId(step.id.clone()));
            }
        }
    }

    let hooks = [&catalog.script.init, &catalog.script.summary];
    for hook in hooks.into_iter().flatten() {
        if !is_shell_identifier(hook) {
            return Err(CatalogError::InvalidScriptFunction(hook.clone()));
        }
    }

    Ok(())
}

// Matches [A-Za-z_][A-Za-z0-9_]*
pub(crate) fn is_shell_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
