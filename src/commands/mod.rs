mod help;
mod start;

pub use help::help;
pub use start::{start, web_app_keyboard};
