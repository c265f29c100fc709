use async_trait::async_trait;
use std::fmt::Debug;

/// One generation round trip, as seen by an interceptor.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub topic: &'a str,
    pub prompt: &'a str,
    pub response: &'a str,
}

/// Observes every raw model exchange, including ones that later fail to parse.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, exchange: Exchange<'_>) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
