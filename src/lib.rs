pub mod bullets;
pub mod compute;
pub mod cooldown;
pub mod entities;
pub mod error;
pub mod formation;
pub mod input;
pub mod render;
pub mod score;
pub mod settings;
pub mod ship;
