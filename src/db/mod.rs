//! Persistence: the user store seam and its PostgreSQL and in-memory backends.

mod memory;
mod pool;
mod repositories;
mod store;

pub use memory::MemoryUserStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::PgUserStore;
pub use store::UserStore;
