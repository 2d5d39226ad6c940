#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod clients;
pub mod config;
pub mod delivery;
pub mod digest;
pub mod observability;
pub mod pipeline;
pub mod util;
