pub mod cmd;
pub mod server;
pub mod util;
