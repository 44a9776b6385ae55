uniffi::setup_scaffolding!();

use smartgym::uniffi_interface::errors::SmartGymError;
use smartgym::*;
use std::path::Path;

const DATABASE_FILE: &str = "smartgym.db";

/// Database file inside the app's documents directory.
#[uniffi::export]
pub fn database_path(app_dir: String) -> String {
    Path::new(&app_dir)
        .join(DATABASE_FILE)
        .to_string_lossy()
        .into_owned()
}

/// Records the database location and applies pending migrations.
#[uniffi::export]
pub fn setup_database(app_dir: String) -> Result<String, SmartGymError> {
    let path = database_path(app_dir);
    let rt = runtime::init_global_runtime_blocking();
    rt.block_on(async {
        db::set_db_path(&path).await?;
        let pool = db::connect(&path).await?;
        pool.close().await;
        Ok::<(), anyhow::Error>(())
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_lives_in_app_dir() {
        let path = database_path("/data/app".to_string());
        assert!(path.starts_with("/data/app"));
        assert!(path.ends_with(DATABASE_FILE));
    }
}
