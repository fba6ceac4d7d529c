use std::path::PathBuf;

use thiserror::Error;

// Problems found while loading or validating the step catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog must contain at least one category")]
    NoCategories,

    #[error("categories[{0}].name must not be empty")]
    EmptyCategoryName(usize),

    #[error("category \"{0}\" has no steps")]
    EmptyCategory(String),

    #[error("step \"{0}\" must have a display name")]
    EmptyStepName(String),

    #[error("step id \"{0}\" is not a valid shell function name")]
    InvalidStepId(String),

    #[error("step id \"{0}\" appears more than once")]
    DuplicateStepId(String),

    #[error("script function \"{0}\" is not a valid shell function name")]
    InvalidScriptFunction(String),
}

// Failures that stop the installer before any step runs
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to write install script in {}: {source}", .dir.display())]
    WriteScript {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create output pipe: {0}")]
    Pipe(std::io::Error),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

// The working directory does not look like the dotfiles checkout
#[derive(Error, Debug)]
#[error("{} was not found; run the installer from the dotfiles directory", .sentinel.display())]
pub struct PreflightError {
    pub sentinel: PathBuf,
}
