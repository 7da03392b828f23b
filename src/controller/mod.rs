pub mod config;
pub mod core;
pub mod notice;


pub use self::config::*;
pub use self::core::*;
pub use self::notice::*;
