//! # divfeed lib

use std::{env, sync::LazyLock};

use log::warn;
use tokio::sync::RwLock;

use crate::config::DfConfig;

pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod ds;
pub mod error;
pub mod financial;
pub mod utils;

pub static CONFIG: LazyLock<RwLock<DfConfig>> = LazyLock::new(|| RwLock::new(DfConfig::default()));

pub async fn init() {
    env_logger::Builder::new()
        .parse_filters(env::var("LOG").as_deref().unwrap_or("off"))
        .init();

    match DfConfig::load() {
        Ok(config) => {
            *CONFIG.write().await = config;
        }
        Err(err) => {
            warn!("Load config error, using defaults: {err}");
        }
    }
}
