pub mod error;
pub mod password;
pub mod service;
pub mod state;
pub mod token;
pub mod twofactor;
pub mod utils;
