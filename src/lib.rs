//! Headless front end for a document verification and payment backend.
//!
//! UI events drive an in-memory [`page::Page`]; uploads, verification and
//! payments go over HTTP, live updates arrive on a reconnecting WebSocket.

pub mod api;
pub mod app;
pub mod component;
pub mod error;
pub mod flows;
pub mod live;
pub mod logging;
pub mod nav;
pub mod page;
pub mod reporter;
pub mod sequencer;
pub mod state;
