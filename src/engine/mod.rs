// Engine: cache window management, export pipeline and the callback context they share.

pub mod backend;
pub mod cache_window;
pub mod composition;
pub mod dispatch;
pub mod exporter;
pub mod manager;
pub mod progress;
pub mod registry;
