#![no_std]

pub use clock::*;
pub use input::*;
pub use layout::*;
pub use phase::*;

mod clock;
mod input;
mod layout;
mod phase;
