//! # loci-engine
//!
//! The pin-and-note engine: a state machine for the drop-pin flow and
//! a session facade tying together moderation, persistence, spatial
//! queries, location search, and realtime sync.
//!
//! - [`PinMachine`]: pin lifecycle with stale-completion protection
//! - [`Session`]: the embedder-facing facade
//!
//! ## Example
//!
//! ```no_run
//! use loci_engine::Session;
//!
//! # async fn run() -> loci_engine::Result<()> {
//! let mut session = Session::from_env().await;
//! session.refresh_notes().await?;
//!
//! session.drop_pin(24.5854, 73.7125)?;
//! session.start_note()?;
//! let note = session.save_note("Lovely sunset view here").await?;
//! println!("saved note {}", note.id);
//!
//! let found = session.nearby(1.0).await;
//! println!("{found:?}");
//! # Ok(())
//! # }
//! ```

pub mod machine;
pub mod session;

// Re-export core types
pub use loci_core::*;
pub use loci_spatial::NearbyOutcome;

pub use machine::{Draft, PinMachine, PinState};
pub use session::Session;
