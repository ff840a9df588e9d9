pub mod encoding;
pub mod file_io;
mod poller;
pub mod time;
pub mod util;

pub use poller::*;
