//! Core library for the PeonPing sound-pack registry generator
//!
//! Turns sound-pack manifests into the registry's published artifacts:
//!
//! ```text
//! og-packs/<pack>/openpeon.json          (local source tree)
//!        or
//! raw.githubusercontent.com/...          (remote, via the published index)
//!        │
//!        ▼
//! source::load_local / RemoteSource      ← uniform LoadedManifest
//!        │
//!        ▼
//! metrics + franchise resolution
//!        │
//!        ├── registry::build_entry  →  registry/packs/<name>/registry.json
//!        │                             registry/index.json
//!        └── packdata::project      →  packs-data.json (website)
//! ```
//!
//! The [`pipeline`] module owns batch orchestration and all output
//! writing; everything else is side-effect-free data transformation.

pub mod config;
pub mod franchise;
pub mod manifest;
pub mod metrics;
pub mod packdata;
pub mod pipeline;
pub mod registry;
pub mod source;
