//! 数据访问层

pub mod chirp_repo;
pub mod user_repo;

pub use chirp_repo::ChirpRepository;
pub use user_repo::UserRepository;
