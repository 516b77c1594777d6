//! Integration tests for configuration loading and validation.

use attachforge::config::{load_config, load_config_or_default, ProcessorConfig, ResizeParams};
use attachforge_imaging::BackendKind;
use std::path::PathBuf;

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attachforge.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn empty_file_gives_defaults() {
    let (_dir, path) = write_config("");
    let config = load_config(&path).unwrap();

    assert_eq!(config.imaging.backend, BackendKind::Auto);
    assert!(config.imaging.magick_path.is_none());
    assert!(config.storage.root.is_none());
    assert!(config.attachments.is_empty());
}

#[test]
fn full_config_parses_in_declared_order() {
    let (_dir, path) = write_config(
        r#"
[imaging]
backend = "raster"
magick_path = "/opt/im/bin/magick"

[storage]
root = "/srv/app/public"

[attachments.avatar]
folder = "avatars"
path = ":folder/:model/:id.:ext"
attribute = "photo"
fallback_image = "images/no-avatar.png"

[attachments.avatar.styles]
thumb = "!100x60"
medium = "300x300"
small = "150x75"

[[attachments.avatar.processors]]
method = "resize"
backend = "magick"
params = { width = 800, height = 600, keepratio = false }

[[attachments.avatar.processors]]
method = "grayscale"

[attachments.document]
"#,
    );
    let config = load_config(&path).unwrap();

    assert_eq!(config.imaging.backend, BackendKind::Raster);
    assert_eq!(
        config.imaging.magick_path,
        Some(PathBuf::from("/opt/im/bin/magick"))
    );
    assert_eq!(config.storage.root, Some(PathBuf::from("/srv/app/public")));
    assert_eq!(
        config.attachments.keys().collect::<Vec<_>>(),
        vec!["avatar", "document"]
    );

    let avatar = config.attachment("avatar").unwrap();
    assert_eq!(avatar.folder, "avatars");
    assert_eq!(avatar.attribute, "photo");
    assert_eq!(avatar.fallback_image.as_deref(), Some("images/no-avatar.png"));
    assert_eq!(
        avatar.styles.keys().collect::<Vec<_>>(),
        vec!["thumb", "medium", "small"]
    );
    assert_eq!(
        avatar.processors,
        vec![
            ProcessorConfig::Resize {
                backend: BackendKind::Magick,
                params: ResizeParams {
                    width: 800,
                    height: 600,
                    keep_ratio: false,
                },
            },
            ProcessorConfig::Grayscale {
                backend: BackendKind::Auto,
            },
        ]
    );

    let document = config.attachment("document").unwrap();
    assert_eq!(document.path, ":folder/:id.:ext");
    assert_eq!(document.attribute, "filename");
}

#[test]
fn keep_ratio_defaults_to_true() {
    let (_dir, path) = write_config(
        r#"
[[attachments.photo.processors]]
method = "resize"
params = { width = 10, height = 20 }
"#,
    );
    let config = load_config(&path).unwrap();

    assert_matches::assert_matches!(
        config.attachment("photo").unwrap().processors[0],
        ProcessorConfig::Resize {
            params: ResizeParams { keep_ratio: true, .. },
            ..
        }
    );
}

#[test]
fn invalid_style_size_is_rejected() {
    let (_dir, path) = write_config(
        r#"
[attachments.photo.styles]
thumb = "100-by-60"
"#,
    );
    let err = load_config(&path).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("photo"), "{message}");
    assert!(message.contains("thumb"), "{message}");
}

#[test]
fn styles_need_extension_suffix() {
    let (_dir, path) = write_config(
        r#"
[attachments.photo]
path = ":folder/:id"

[attachments.photo.styles]
thumb = "100x60"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn unknown_processor_method_is_rejected() {
    let (_dir, path) = write_config(
        r#"
[[attachments.photo.processors]]
method = "sharpen"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn unknown_backend_is_rejected() {
    let (_dir, path) = write_config(
        r#"
[imaging]
backend = "gd"
"#,
    );
    assert!(load_config(&path).is_err());
}

#[test]
fn explicit_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_or_default(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn explicit_path_is_used() {
    let (_dir, path) = write_config("[attachments.photo]\nfolder = \"pics\"\n");
    let config = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.attachment("photo").unwrap().folder, "pics");
}
