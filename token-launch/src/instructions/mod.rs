pub mod metadata;
pub mod token;

pub use metadata::*;
pub use token::*;
