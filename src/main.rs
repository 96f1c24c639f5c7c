//! 股票预测后端服务
//!
//! 提供股价趋势预测和自选股涨跌幅的 RESTful API 服务
//! 数据来源：Yahoo Finance

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::permissive_cors;
use crate::services::gateway::YahooGateway;
use crate::state::AppState;

/// 应用程序入口
///
/// 启动 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先，否则使用配置中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.clone()));
    log::info!("{}", source);

    let gateway = YahooGateway::new(config.gateway.clone()).map_err(|e| {
        log::error!("创建行情数据源失败: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let state = web::Data::new(AppState::new(Arc::new(gateway), &config));

    let bind_addr = config.bind_addr();
    log::info!(
        "启动股票预测后端服务，监听 {}，自选股 {} 只",
        bind_addr,
        config.tickers.watchlist.len()
    );

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(permissive_cors())   // 跨域
            .wrap(Logger::default())   // 添加请求日志中间件
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
