pub mod evaluate;
pub mod model;
