// src/models/mod.rs

pub mod payload;
pub mod row;
pub mod schedule;
pub mod survey;
