//! Canteen voucher redemption engine.
//!
//! The crate is a small hexagon: [`domain`] holds the entities, the
//! validators and the redemption orchestrator together with the ports it
//! depends on; [`outbound`] provides adapters implementing those ports;
//! [`config`] loads runtime settings.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
