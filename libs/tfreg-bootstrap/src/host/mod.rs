pub mod paths;

pub use paths::{HomeDirError, expand_tilde};
