//! Input adapters for the fractal streamer.
//!
//! This module contains the command-line surfaces of the two binaries and
//! translates them into render parameters and coordinator configuration.

pub mod cli;
