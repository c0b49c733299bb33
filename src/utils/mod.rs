pub mod filename;
pub mod flash;
pub mod jwt;
pub mod password;
