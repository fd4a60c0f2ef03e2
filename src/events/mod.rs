//! # Events Module
//!
//! Progress reporting over channels, so any front end (CLI, GUI, service)
//! can follow long-running derivative generation.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Derive(DeriveEvent::Generated { profile, .. }) = event {
//!             println!("generated {}", profile);
//!         }
//!     }
//! });
//!
//! engine.resample_default(&file, false, Some(&sender))?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
