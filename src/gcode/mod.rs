//! G-code decoding.
//!
//! Bytes go into a [`LineBuffer`], each complete line becomes a [`Block`]
//! and a block is interpreted as a [`Command`].

mod block;
mod command;
mod line;

pub use block::Block;
pub use command::Command;
pub use line::{LineBuffer, LINE_CAPACITY};
