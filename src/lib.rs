pub mod admin;
pub mod app;
pub mod auth;
pub mod badges;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gating;
pub mod notify;
pub mod progress;
pub mod render;
pub mod routes;
pub mod session;
pub mod shell;
pub mod storage;
pub mod types;
pub mod validator;

pub mod metadata {
    include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
}

pub use app::AppContext;
pub use error::{ServiceError, ServiceResult};
