//! Deferred handlers run by the host after a mention has been acknowledged.

pub mod menu;
