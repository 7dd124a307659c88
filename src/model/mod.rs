pub mod config;
pub mod copy;
pub mod fixture;
pub mod mode;
pub mod plugin;
pub mod search;
pub mod view_state;
