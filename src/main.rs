//! inkpress API server entry point.

use std::sync::Arc;

use inkpress::account::repository::{
    AccountRepository, MemoryAccountRepository, PgAccountRepository,
};
use inkpress::account::service::AccountService;
use inkpress::auth::credential::CredentialIssuer;
use inkpress::config::AppConfig;
use inkpress::db::Database;
use inkpress::gateway::{self, state::AppState};
use inkpress::logging;
use inkpress::post::repository::{MemoryPostRepository, PgPostRepository, PostRepository};
use inkpress::post::service::PostService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = logging::init_logging(&config);
    tracing::info!("starting inkpress (env: {})", env);

    let (account_repo, post_repo): (Arc<dyn AccountRepository>, Arc<dyn PostRepository>) =
        match &config.postgres_url {
            Some(url) => {
                let db = Database::connect(url).await?;
                db.health_check().await?;
                let pool = db.pool().clone();
                (
                    Arc::new(PgAccountRepository::new(pool.clone())),
                    Arc::new(PgPostRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("no postgres_url configured; using the in-memory store");
                (
                    Arc::new(MemoryAccountRepository::new()),
                    Arc::new(MemoryPostRepository::new()),
                )
            }
        };

    let issuer = CredentialIssuer::new(&config.auth);
    let accounts = AccountService::new(account_repo, issuer.clone());
    let posts = PostService::new(post_repo);

    if env == "dev" {
        seed_dev_data(&accounts, &posts).await?;
    }

    let state = Arc::new(AppState::new(accounts, posts, issuer));
    gateway::serve(&config, state).await
}

/// Seed well-known dev accounts and a couple of posts so the service is
/// explorable immediately. No-op when accounts already exist.
async fn seed_dev_data(accounts: &AccountService, posts: &PostService) -> anyhow::Result<()> {
    if accounts.count().await? > 0 {
        return Ok(());
    }

    accounts.register("system", "1234", "System").await?;
    let admin = accounts.register("admin", "1234", "Administrator").await?;
    let user1 = accounts.register("user1", "user11234", "Aria").await?;
    accounts.register("user2", "user21234", "Basil").await?;
    accounts.register("user3", "user31234", "Cedar").await?;

    let first = posts
        .write(&user1, "hello inkpress", "the first post", true, true)
        .await?;
    posts.add_comment(&first, &admin, "welcome!").await?;
    posts
        .write(&admin, "maintenance notes", "drafts stay private", false, false)
        .await?;

    tracing::info!("dev data seeded");
    Ok(())
}
