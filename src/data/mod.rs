/// Data layer: core types, loading, reformatting, and chart preparation.
///
/// Architecture:
/// ```text
///  raw sample dump          signal dump (header + columns, or tagged)
///        │                                   │
///        ▼                                   ▼
///   ┌──────────┐                       ┌──────────┐
///   │  loader   │ → NumericStream      │  loader   │ → SignalTable
///   └──────────┘                       └──────────┘
///        │                                   │
///        ▼                                   ▼
///   ┌──────────┐                       ┌──────────┐
///   │ reformat  │ → delimited rows     │  chart    │ → Vec<Curve>
///   └──────────┘                       └──────────┘
/// ```

pub mod chart;
pub mod error;
pub mod loader;
pub mod model;
pub mod reformat;
