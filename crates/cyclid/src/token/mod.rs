mod generator;
mod status;
#[allow(clippy::module_inception)]
mod token;

pub use generator::*;
pub use status::*;
pub use token::*;
