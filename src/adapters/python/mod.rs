//! Python source support.

mod extractor;

pub use extractor::PythonExtractor;
