use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{KitabakError, Result};
use crate::app::Identity;
use crate::domain::UserId;
use crate::store::sqlite::SqliteStore;
use crate::tracker::{ReadingTracker, SystemClock};

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub tracker: ReadingTracker,
    pub identity: Identity,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, user: UserId, default_goal_minutes: u32) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self::with_store(store, user, default_goal_minutes))
    }

    pub fn in_memory(user: UserId, default_goal_minutes: u32) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::with_store(store, user, default_goal_minutes))
    }

    fn with_store(store: Arc<SqliteStore>, user: UserId, default_goal_minutes: u32) -> Self {
        let tracker = ReadingTracker::new(store.clone(), Arc::new(SystemClock), default_goal_minutes);

        Self {
            store,
            tracker,
            identity: Identity::signed_in(user),
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| KitabakError::Config("Could not find data directory".into()))?;
        let kitabak_dir = data_dir.join("kitabak");
        std::fs::create_dir_all(&kitabak_dir)?;
        Ok(kitabak_dir.join("kitabak.db"))
    }
}
