//! 跨域中间件
//!
//! 前端部署在独立域名下，允许任意来源访问

use actix_cors::Cors;

/// 允许任意来源、方法和请求头，响应头返回 `Access-Control-Allow-Origin: *`
pub fn permissive_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}
