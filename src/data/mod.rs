/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → IndexTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ IndexTable  │  Vec<IndexRecord>, distinct year/code lists
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  code/name + year predicate → sorted indices, callouts
///   └──────────┘
/// ```
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
