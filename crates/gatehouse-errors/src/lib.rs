pub mod code;
pub mod kind;
pub mod model;
pub mod prelude;
pub mod render;
pub mod retry;
