//! 业务逻辑服务模块
//!
//! 封装数据获取和处理逻辑

pub mod estimator;      // 趋势预测
pub mod gateway;        // 行情数据源
pub mod stock_service;  // 预测与行情条服务
