pub mod app;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod eutils;
pub mod fs_util;
pub mod ftp;
pub mod layout;
pub mod markup;
pub mod ncbi;
pub mod output;
pub mod report;
pub mod retrieve;
pub mod retry;
