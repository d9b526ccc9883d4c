use std::fmt;
use std::str::FromStr;

/// How a resource reaches the caller.
///
/// `Indirect` variants route through this service's own redirect endpoints;
/// `Direct` variants hand out the already-signed external URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStrategy {
    /// Bytes read from the store and served by this service
    Direct,
    /// `/s3/{id}`, which redirects to a presigned object-store URL
    ObjectStoreIndirect,
    /// Presigned object-store URL
    ObjectStoreDirect,
    /// `/cf/{id}`, which redirects to a signed CDN URL
    CdnIndirect,
    /// Signed CDN URL
    CdnDirect,
}

impl DeliveryStrategy {
    /// Every strategy, in listing order.
    pub const ALL: [DeliveryStrategy; 5] = [
        DeliveryStrategy::Direct,
        DeliveryStrategy::ObjectStoreIndirect,
        DeliveryStrategy::ObjectStoreDirect,
        DeliveryStrategy::CdnIndirect,
        DeliveryStrategy::CdnDirect,
    ];

    /// URL path segment of the strategy's listing page.
    pub fn slug(self) -> &'static str {
        match self {
            DeliveryStrategy::Direct => "database",
            DeliveryStrategy::ObjectStoreIndirect => "s3-indirect",
            DeliveryStrategy::ObjectStoreDirect => "s3-direct",
            DeliveryStrategy::CdnIndirect => "cf-indirect",
            DeliveryStrategy::CdnDirect => "cf-direct",
        }
    }

    /// Human-readable page title.
    pub fn title(self) -> &'static str {
        match self {
            DeliveryStrategy::Direct => "Database",
            DeliveryStrategy::ObjectStoreIndirect => "S3: Indirect",
            DeliveryStrategy::ObjectStoreDirect => "S3: Direct",
            DeliveryStrategy::CdnIndirect => "CF: Indirect",
            DeliveryStrategy::CdnDirect => "CF: Direct",
        }
    }

    pub fn is_indirect(self) -> bool {
        matches!(
            self,
            DeliveryStrategy::ObjectStoreIndirect | DeliveryStrategy::CdnIndirect
        )
    }
}

impl fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Unrecognised strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown delivery strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for DeliveryStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.slug() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}
