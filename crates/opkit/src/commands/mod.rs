//! Command implementations that are not plain library calls.

pub mod init;
