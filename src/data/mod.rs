/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop missing/duplicate rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  ordered columns, row-major cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  outcome equality predicate → filtered indices
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
