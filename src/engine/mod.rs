pub mod cancel;
pub mod compare;
pub mod core;
pub mod key;

#[cfg(test)]
mod tests;

pub use self::cancel::*;
pub use self::compare::*;
pub use self::core::*;
pub use self::key::*;
