pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod locator;
pub mod model;
pub mod sys;
pub mod ui;
