pub mod cli;
pub mod commands;
pub mod error;
pub mod macros;
pub mod render;
pub mod server;
pub mod store;
pub mod tools;
pub mod types;
pub mod watch;

pub mod metadata {
    include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
}
