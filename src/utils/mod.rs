pub mod filesystem;
pub mod style;
pub mod test_helpers;
