/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote .csv / local .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch / read → RawTable   (cached per source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  drop rows, parse years, derive profit/roi → MovieTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / genre / rating predicates → MovieView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  metrics, top-N, yearly means, score histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
