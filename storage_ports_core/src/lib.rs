#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_debug_implementations,
    future_incompatible,
    let_underscore,
//     missing_docs,
    rust_2021_compatibility,
    nonstandard_style
)]
#![deny(unreachable_pub)]

//! Relay between an application's storage ports and a key-value storage area.
//!
//! At startup the whole area is read into a [`Snapshot`] and handed to the
//! application as its initial configuration. Afterwards a [`Relay`] forwards
//! writes coming out of the application into storage, and storage events raised
//! by other tabs back into the application.
//!
//! [`Snapshot`]: snapshot::Snapshot
//! [`Relay`]: relay::Relay

pub mod change;
pub mod defer;
pub mod error;
pub mod listener;
pub mod relay;
pub mod snapshot;
pub mod storage;
pub mod value;
