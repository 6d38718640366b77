//! HTTP 处理器

pub mod admin;
pub mod auth;
pub mod chirp;
pub mod health;
pub mod user;
pub mod webhook;
