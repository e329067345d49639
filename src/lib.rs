pub mod engine;
pub mod engine_config;
pub mod events;
pub mod geometry_utils;
pub mod hands;
pub mod scene;
pub mod systems;

pub type Point2D = (f32, f32);
