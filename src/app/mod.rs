pub mod context;
pub mod error;
pub mod identity;

pub use context::AppContext;
pub use error::{KitabakError, Result};
pub use identity::Identity;
