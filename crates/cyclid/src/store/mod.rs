mod error;
mod executor;
mod interface;
#[cfg(feature = "memory")]
mod memory;
mod script;
#[cfg(all(test, feature = "memory"))]
mod tests;

pub use error::*;
pub use executor::*;
pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
#[cfg(feature = "memory")]
pub use memory::*;
pub use script::*;
