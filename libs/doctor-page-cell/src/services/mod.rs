pub mod backend;
pub mod editor;
pub mod loader;
pub mod page;
pub mod registry;
