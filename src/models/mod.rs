//! 领域模型与请求/响应 DTO

pub mod auth;
pub mod chirp;
pub mod user;
