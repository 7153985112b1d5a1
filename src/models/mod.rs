// src/models/mod.rs

pub mod answer;
pub mod attempt;
pub mod identity;
pub mod question;
pub mod quiz;
