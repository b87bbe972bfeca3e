pub mod camera3d;
pub mod cli;
pub mod config;
pub mod light;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod shadow;
pub mod time;
