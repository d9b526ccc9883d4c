//! Delivery strategies and the resolver that dispatches between them.
//!
//! A caller supplies a resource id and a [`DeliveryStrategy`]; the
//! [`DeliveryResolver`] either reads the bytes from the store or asks the
//! matching signer for a fresh URL.
//!
//! ```text
//!                 resolve(id, strategy)
//!                          │
//!        ┌─────────────────┼──────────────────┐
//!        ▼                 ▼                  ▼
//!     Direct      ObjectStore{In,}Direct  Cdn{In,}Direct
//!        │                 │                  │
//!  ResourceStore   ObjectStoreSigner      CdnSigner
//!        │                 │                  │
//!   {mime, bytes}    {url, expiry}      {url, expiry}
//! ```

mod resolver;
mod strategy;

pub use resolver::{DeliveryResolver, DeliveryResult};
pub use strategy::{DeliveryStrategy, UnknownStrategy};
