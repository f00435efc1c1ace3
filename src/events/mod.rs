//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! The pipeline emits events through a channel; a CLI, GUI or log sink
//! subscribes on the other end. Nothing in the pipeline waits for a
//! listener.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Smash(SmashEvent::Progress(p)) = event {
//!             println!("{} files so far", p.files_seen);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
