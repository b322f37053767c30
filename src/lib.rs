//! Test support for the Candlepin entitlement service.
//!
//! This crate backs suites that exercise a Candlepin deployment through
//! its REST API: scenario fixtures that track and tear down the tenants
//! they create, checks for the two-tier expiry policy on entitlement
//! certificates, and retrieval of the nested consumer export archives.
//!
//! The REST client itself is a collaborator, not part of this crate.
//! Everything is written against the [`client::CandlepinApi`] trait;
//! [`test::MemoryCandlepin`] implements it in memory for suites that
//! run without a deployment.

pub mod api;
pub mod cert;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod file;
pub mod scenario;

//------------ Response Alias ------------------------------------------------

pub type TestkitResult<T> = std::result::Result<T, error::Error>;
