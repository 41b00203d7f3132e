//! # I/O Layer
//!
//! Translates between the outside world and the domain services. The only
//! interface today is the REST API in [`rest`].

pub mod rest;
