// Command modules for the token-launch CLI

pub mod derive;
pub mod launch;
pub mod utils;
