pub mod canonicalize;
pub mod generate;
pub mod validate;
