#![cfg(test)]
use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use models::db::{connect_with_config, migrate};

/// Each call returns its own migrated in-memory database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    migrate(&db).await?;
    Ok(db)
}

/// A small, fully decodable image encoded as `format`.
pub fn encoded_image(format: image::ImageFormat) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut buf, format)
        .expect("encode sample image");
    buf.into_inner()
}
