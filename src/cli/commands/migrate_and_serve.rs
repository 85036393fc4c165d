use anyhow::Result;

use super::{init_database, serve};

/// Apply pending migrations, then hand over to the regular serve path.
pub async fn migrate_and_serve(database_url: &str, bind_address: &str) -> Result<()> {
    init_database(database_url).await?;
    serve(database_url, bind_address).await
}
