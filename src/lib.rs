pub mod prelude {
    pub use super::common::prelude::*;
}

pub mod belts;
pub mod common;
pub mod factory;