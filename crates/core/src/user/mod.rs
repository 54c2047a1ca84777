//! Users and their rolled-up statistics

pub mod ports;
pub mod service;

pub use ports::UserRepository;
pub use service::UserService;
