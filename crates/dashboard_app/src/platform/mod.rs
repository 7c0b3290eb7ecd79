//! Terminal front end: event loop, effect execution, rendering and logging.
pub mod app;
pub mod effects;
pub mod logging;
pub mod render;
