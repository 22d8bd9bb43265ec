#![no_std]

extern crate alloc;

pub use battle::*;
pub use energy::*;
pub use error::*;
pub use event::*;
pub use game::*;
pub use grid::*;
pub use history::*;
pub use rules::*;
pub use tile::*;
pub use types::*;

pub use rand::rngs::SmallRng;

mod battle;
mod energy;
mod error;
mod event;
mod game;
mod grid;
mod history;
mod rules;
mod tile;
mod types;
