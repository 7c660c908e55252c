mod advance;
mod cycle;

pub use advance::*;
pub use cycle::*;
