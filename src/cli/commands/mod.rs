mod create_user;
mod serve;

pub use create_user::cmd_create_user;
pub use serve::run_server;
