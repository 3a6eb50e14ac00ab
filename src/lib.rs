pub mod agent;
pub mod draw;
pub mod gui;
pub mod hearing;
pub mod logging;
pub mod model;
pub mod persist;
pub mod settings;
pub mod sound;
