//! Month-view task planning: the grid,
//! the persisted task list, filtering, bar
//! layout and pointer gestures. Nothing
//! here touches a browser or the file
//! system directly; storage goes through
//! [`store::KeyValueStore`].

pub mod config;
pub mod filter;
pub mod grid;
pub mod interaction;
pub mod layout;
pub mod store;
pub mod task;
