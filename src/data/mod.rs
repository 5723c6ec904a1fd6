/// Data layer: record model, parsing, cycle detection and series projection.
///
/// Architecture:
/// ```text
///  .txt / .csv (tab separated, ',' decimals)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Dataset (+ skipped rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<RawRecord>, active range, normalization
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cycles   │  current sign changes → boundaries → cycle ranges
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ selection /   │  user cycle text → cycle indices
///   │ series        │  per-file projected (x, y) segments
///   └──────────────┘
/// ```

pub mod cycles;
pub mod error;
pub mod loader;
pub mod model;
pub mod selection;
pub mod series;
