//! 业务服务层

pub mod auth_service;
pub mod refresh_store;

pub use auth_service::AuthService;
pub use refresh_store::RefreshTokenStore;
