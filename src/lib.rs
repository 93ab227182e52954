//! Install, launch and supervise games running under wine-based runners.

pub mod battlenet;
pub mod config;
pub mod error;
pub mod install;
pub mod paths;
pub mod prefix;
pub mod process;
pub mod productdb;
pub mod runner;
pub mod ui;
pub mod wine;

pub use error::{Error, ErrorKind, Result};
