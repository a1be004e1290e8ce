// Media library view: items, generation-stamped fetch results, and the layout/cache capabilities.

pub mod fetch;
pub mod grid;
pub mod index;
pub mod item;
pub mod traits;
