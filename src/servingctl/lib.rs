//! # servingctl Architecture
//!
//! servingctl manages serving resources (services, revisions, routes, configurations).
//! The same commands run against any backend that implements [`client::ServingClient`];
//! the backend shipped here is **gitops mode**, which keeps services as YAML files in a
//! directory tree meant to be committed to version control.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, print.rs)                     │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses KEY=VALUE input, applies configured limits        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per user-facing operation                   │
//! │  - Returns `Result<CmdResult>`, never prints                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client Layer (client/)                                     │
//! │  - ServingClient trait + update-with-retry                  │
//! │  - GitOpsClient (files), MemoryClient (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## gitops mode on disk
//!
//! ```text
//! <root>/<namespace>/ksvc/<name>.yaml
//! ```
//!
//! With an empty namespace the namespace level is dropped and listing covers every
//! namespace under the root. Only services have a directory; every other kind is
//! rejected with `ServingError::Unsupported`.
//!
//! ## Testing
//!
//! - Client tests write to `tempfile` directories.
//! - Command and API tests run against `MemoryClient`, which behaves like a cluster
//!   (duplicate creates rejected, stale writes conflict), and against `GitOpsClient`.
//! - `tests/` drives the library end to end and the binary through `assert_cmd`.

pub mod api;
pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
