mod bounded;
mod error;
mod item;


pub use bounded::*;
pub use error::*;
pub use item::*;
