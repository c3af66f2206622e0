mod tree;

pub use tree::FsSourceTree;
