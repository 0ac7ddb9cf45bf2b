use crate::config::types::{
    ArchiveConfig, AssetConfig, BrowserConfig, Config, ScrollConfig, SelectorConfig, SiteConfig,
    SnapshotConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_archive_config(&config.archive)?;
    validate_browser_config(&config.browser)?;
    validate_snapshot_config(&config.snapshot)?;
    validate_scroll_config(&config.scroll)?;
    validate_asset_config(&config.assets)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates the origin and timezone
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let origin = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if origin.scheme() != "https" && origin.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must use HTTP or HTTPS",
            config.origin
        )));
    }

    if origin.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' has no host",
            config.origin
        )));
    }

    if !(-12..=14).contains(&config.utc_offset_hours) {
        return Err(ConfigError::Validation(format!(
            "utc_offset_hours must be between -12 and 14, got {}",
            config.utc_offset_hours
        )));
    }

    Ok(())
}

/// Validates archive layout labels
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("base_dir", &config.base_dir),
        ("log_file", &config.log_file),
        ("latest_news_label", &config.latest_news_label),
        ("gallery_label", &config.gallery_label),
        ("single_image_label", &config.single_image_label),
        ("untitled_label", &config.untitled_label),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates browser context settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.viewport_width < 1 || config.viewport_height < 1 {
        return Err(ConfigError::Validation(format!(
            "viewport must be at least 1x1, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    // Navigation is itself a browser command
    if config.command_timeout_ms < config.navigation_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "command_timeout_ms ({}ms) must not be shorter than navigation_timeout_ms ({}ms)",
            config.command_timeout_ms, config.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates page layout used for snapshots
fn validate_snapshot_config(config: &SnapshotConfig) -> Result<(), ConfigError> {
    if config.paper_width_in <= 0.0 || config.paper_height_in <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "paper size must be positive, got {}x{} in",
            config.paper_width_in, config.paper_height_in
        )));
    }

    Ok(())
}

/// Validates auto-scroll pacing
fn validate_scroll_config(config: &ScrollConfig) -> Result<(), ConfigError> {
    if config.step_px < 1 {
        return Err(ConfigError::Validation(
            "scroll step_px must be >= 1".to_string(),
        ));
    }

    if config.interval_ms < 1 {
        return Err(ConfigError::Validation(
            "scroll interval_ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the attachment extension list
fn validate_asset_config(config: &AssetConfig) -> Result<(), ConfigError> {
    for extension in &config.extensions {
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "asset extension '{}' must be non-empty and alphanumeric (no leading dot)",
                extension
            )));
        }
    }

    Ok(())
}

/// Validates that selectors parse as CSS
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, value) in [("breadcrumb", &config.breadcrumb), ("title", &config.title)] {
        Selector::parse(value).map_err(|e| {
            ConfigError::Validation(format!("{} selector '{}' is invalid: {:?}", name, value, e))
        })?;
    }

    Ok(())
}
