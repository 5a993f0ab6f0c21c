//! Utilities shared by the Kakehashi binaries and the server library.

pub mod logger;
pub mod time;
