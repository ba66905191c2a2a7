//! Fixed-size isochromat storage for ensemble propagation.
//!
//! Every isochromat is a fixed-size [`Magnetization`](mrsim_core::Magnetization)
//! record addressed by its flat position index. Positions never interact,
//! so a contiguous index range can be handed to a worker without aliasing.
//!
//! # Architecture
//!
//! ```text
//! PingPongArena
//! ├── buffer A ─┐ alternate between published (read) and staging (write)
//! ├── buffer B ─┘ on every publish()
//! └── generation counter
//!
//! Trajectory
//! └── samples × positions, row-major by sample
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pingpong;
pub mod trajectory;

pub use config::ArenaConfig;
pub use error::ArenaError;
pub use pingpong::PingPongArena;
pub use trajectory::Trajectory;
