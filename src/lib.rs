pub use util::*;

pub mod solver;

mod util;
