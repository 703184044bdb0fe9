pub mod trending;

#[cfg(test)]
mod trending_http_tests;

pub use trending::configure_trending_routes;
