pub mod canvas;
pub mod config;
pub mod engine;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod types;
