pub mod command_executor;
pub mod token_manager;

pub use command_executor::{CommandError, CommandRunner};
pub use token_manager::TokenManager;
