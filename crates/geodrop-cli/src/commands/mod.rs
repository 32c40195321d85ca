//! CLI command implementations

pub mod init_db;
pub mod publish;
pub mod status;
