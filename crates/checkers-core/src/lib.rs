pub mod board;
pub mod perspective;
pub mod protocol;
