// src/image_types/mod.rs

pub mod dc42;
