pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod installer;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod plan;
pub mod selection;
pub mod ui;
