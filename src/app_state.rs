use std::sync::Arc;

use crate::{
    auth::{PendingUsernames, SessionService, VerificationCodes},
    config::Config,
    notify::{LogNotifier, Notifier},
    store::{CommentStore, Database, ReviewStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub reviews: ReviewStore,
    pub comments: CommentStore,
    pub sessions: SessionService,
    pub pending_usernames: Arc<PendingUsernames>,
    pub verification_codes: Arc<VerificationCodes>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database = Database::new(&config.database.url).await?;
        database.init().await?;

        Ok(Self::with_database(&database, config))
    }

    pub fn with_database(database: &Database, config: Config) -> Self {
        let pool = database.pool().clone();

        Self {
            users: UserStore::new(pool.clone()),
            reviews: ReviewStore::new(pool.clone(), config.paging.review_page_size),
            comments: CommentStore::new(pool.clone(), config.paging.comment_page_size),
            sessions: SessionService::new(pool, config.auth.session_ttl_secs),
            pending_usernames: Arc::new(PendingUsernames::new(config.auth.handoff_ttl_secs)),
            verification_codes: Arc::new(VerificationCodes::new(config.auth.handoff_ttl_secs)),
            notifier: Arc::new(LogNotifier),
            config,
        }
    }
}
