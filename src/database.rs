use surrealdb::{
    engine::any::{self, Any},
    opt::auth::Root,
    Surreal,
};

use crate::{config::DbConfig, Result};

const SCHEMA: &str = r#"
    DEFINE INDEX IF NOT EXISTS playback_song_user ON TABLE playback FIELDS song, user;
    DEFINE INDEX IF NOT EXISTS history_song ON TABLE history FIELDS song;
    DEFINE INDEX IF NOT EXISTS rating_user_song_type ON TABLE rating FIELDS user, song, `type` UNIQUE;
    DEFINE INDEX IF NOT EXISTS playlist_user_default ON TABLE playlist FIELDS user, is_default;
"#;

pub async fn connect(config: &DbConfig) -> Result<Surreal<Any>> {
    tracing::info!("Connecting to database at: {}", config.url);

    let db = any::connect(&config.url).await?;
    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await?;
    db.signin(Root {
        username: &config.username,
        password: &config.password,
    })
    .await?;

    init_schema(&db).await?;

    tracing::info!("Database connected successfully!");

    Ok(db)
}

/// Indexes backing the lookups done per request
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    db.query(SCHEMA).await?.check()?;
    Ok(())
}
