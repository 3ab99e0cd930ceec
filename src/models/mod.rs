// src/models/mod.rs

pub mod ai;
pub mod analytics;
pub mod badge;
pub mod booking;
pub mod chat;
pub mod feedback;
pub mod forum;
pub mod mentor;
pub mod peer;
pub mod post;
pub mod progress;
pub mod user;
