// Engine modules: scene, physics, rendering, input, assets and the frame loop

pub mod app;
pub mod assets;
pub mod config;
pub mod game_loop;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod scene;
