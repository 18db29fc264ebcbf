use bookclub::app_state::AppState;
use bookclub::config::{AuthConfig, Config, DatabaseConfig, PagingConfig, ServerConfig};
use bookclub::models::{Actor, NewUser};
use bookclub::store::Database;

#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        paging: PagingConfig {
            review_page_size: 10,
            comment_page_size: 5,
        },
        auth: AuthConfig {
            session_ttl_secs: 3600,
            handoff_ttl_secs: 600,
        },
    }
}

#[allow(dead_code)]
pub async fn test_state() -> AppState {
    let database = Database::new_in_memory().await.unwrap();
    AppState::with_database(&database, test_config())
}

#[allow(dead_code)]
pub async fn register(state: &AppState, username: &str, is_admin: bool) -> Actor {
    let user = state
        .users
        .create(NewUser {
            username: username.to_string(),
            is_admin,
            ..NewUser::default()
        })
        .await
        .unwrap();

    Actor::from(&user)
}
