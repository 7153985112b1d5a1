// src/services/mod.rs

pub mod authoring;
pub mod grading;
pub mod ownership;
pub mod projection;
pub mod quiz;
