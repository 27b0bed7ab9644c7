pub mod check;
pub mod emit;
