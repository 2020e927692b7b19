pub mod access;
pub mod models;

pub use access::{map_to_catalog_ids, partition_catalog};
pub use models::{AppDescriptor, DEFAULT_COLOR, DEFAULT_ICON};

/// Build the application catalog from the environment
///
/// Reads `APP_{TYPE}_*` variables for every configured application type.
/// Never logs URLs or ids read from the environment, only the summary.
pub fn load_catalog_from_env(app_types: &[String]) -> Vec<AppDescriptor> {
    let catalog = load_catalog(app_types, |key| std::env::var(key).ok());

    let ids: Vec<&str> = catalog.iter().map(|app| app.id.as_str()).collect();
    if catalog.is_empty() {
        tracing::warn!(
            app_types = ?app_types,
            "No application configured; expected APP_<TYPE>_APPID, APP_<TYPE>_URL and APP_<TYPE>_NAME"
        );
    } else {
        tracing::info!(
            configured_types = app_types.len(),
            loaded_apps = catalog.len(),
            app_ids = ?ids,
            "Application catalog loaded"
        );
    }

    catalog
}

/// Build the application catalog using `lookup` to resolve variable names
///
/// A type is only included when its identifier, URL and name are all present
/// and non-empty. Description, icon and color fall back to defaults.
pub fn load_catalog<F>(app_types: &[String], lookup: F) -> Vec<AppDescriptor>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |app_type: &str, field: &str| {
        lookup(&format!("APP_{}_{}", app_type, field)).filter(|v| !v.is_empty())
    };

    app_types
        .iter()
        .filter_map(|app_type| {
            let (Some(app_id), Some(url), Some(name)) = (
                var(app_type, "APPID"),
                var(app_type, "URL"),
                var(app_type, "NAME"),
            ) else {
                tracing::debug!(app_type = %app_type, "Skipping incompletely configured app type");
                return None;
            };

            Some(AppDescriptor {
                id: app_type.to_lowercase(),
                app_id,
                description: var(app_type, "DESCRIPTION")
                    .unwrap_or_else(|| format!("{} application", name)),
                name,
                url,
                icon: var(app_type, "ICON").unwrap_or_else(|| DEFAULT_ICON.to_string()),
                color: var(app_type, "COLOR").unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            })
        })
        .collect()
}
