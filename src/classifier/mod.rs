pub mod path_classifier;

pub use path_classifier::{Classification, FileKind, PathClassifier};
