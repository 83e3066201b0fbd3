use async_trait::async_trait;

use crate::entities::GeoInfo;
use crate::errors::LookupError;

#[async_trait]
pub trait GeoLookupService: Send + Sync {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, LookupError>;
}
