#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod mutex;
mod rand;
mod sequence;
#[cfg(feature = "serde")]
mod serde;
mod sleep;
mod store;
mod time;
mod token;

pub use crate::error::*;
pub use crate::mutex::*;
pub use crate::rand::*;
pub use crate::sequence::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::sleep::*;
pub use crate::store::*;
pub use crate::time::*;
pub use crate::token::*;
