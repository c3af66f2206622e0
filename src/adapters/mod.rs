pub mod fs;
pub mod oracle;
pub mod python;
pub mod test_runner;
