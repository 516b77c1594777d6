mod types;

pub use types::*;

use anyhow::{Context, Result};
use attachforge_common::{PathTemplate, SizeSpec, Token};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./attachforge.toml",
        "~/.config/attachforge/config.toml",
        "/etc/attachforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(root) = &config.storage.root {
        if !root.exists() {
            tracing::warn!("Storage root does not exist yet: {:?}", root);
        }
    }

    for (name, attachment) in &config.attachments {
        validate_attachment(attachment)
            .with_context(|| format!("Invalid attachment '{}'", name))?;
    }

    Ok(())
}

/// Validate a single attachment definition
pub fn validate_attachment(config: &AttachmentConfig) -> Result<()> {
    if config.attribute.is_empty() {
        anyhow::bail!("Attribute name cannot be empty");
    }

    if config.path.is_empty() {
        anyhow::bail!("Path template cannot be empty");
    }

    for (style, size) in &config.styles {
        size.parse::<SizeSpec>()
            .with_context(|| format!("Style '{}' has an invalid size", style))?;
    }

    for processor in &config.processors {
        if let ProcessorConfig::Resize { params, .. } = processor {
            if params.width == 0 || params.height == 0 {
                anyhow::bail!("Resize processor needs a non-zero width and height");
            }
        }
    }

    let template = PathTemplate::new(config.path.as_str());
    if !config.styles.is_empty() {
        // Variant paths are derived from the base path at delete time.
        if !template.ends_with_extension() {
            anyhow::bail!(
                "Path '{}' must end with '.:ext' when styles are declared",
                config.path
            );
        }

        for token in [Token::Filename, Token::Custom] {
            if template.uses(token) {
                tracing::warn!(
                    "Path '{}' uses ':{}', style variants may not be found after the record changes",
                    config.path,
                    token.name()
                );
            }
        }
    }

    Ok(())
}
