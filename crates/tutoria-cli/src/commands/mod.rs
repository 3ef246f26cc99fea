pub mod clear;
pub mod init;
pub mod listing;
pub mod run;
pub mod validate;
