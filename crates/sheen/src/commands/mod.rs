pub mod export;
pub mod init;
pub mod locale;
pub mod preview;
pub mod routes;
