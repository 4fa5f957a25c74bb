//! Data layer: decoding, loading, caching and statistics.
//!
//! Architecture:
//! ```text
//!   survey .csv (unknown encoding)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ encoding  │  candidates, script ratio, misdecode hint
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  decode + parse per candidate → ResolvedDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  path → Arc<ResolvedDataset>, mtime invalidation
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats    │  numeric coercion, group means, regression, KPIs
//!   └──────────┘
//! ```

pub mod cache;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod model;
pub mod stats;
