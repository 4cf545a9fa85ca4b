pub mod constants;
pub mod entities;
pub mod frame;
pub mod input;
pub mod manager;
pub mod physics;
pub mod session;
pub mod spatial;
pub mod state;
