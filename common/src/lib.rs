pub mod model;
pub mod key;
pub mod document;

pub use model::*;
pub use key::*;
