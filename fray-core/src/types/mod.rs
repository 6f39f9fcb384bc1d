mod account;
mod primitives;

pub use account::*;
pub use primitives::*;
