mod cli;

use attachforge::config::{self, AttachmentConfig, Config};
use attachforge::{
    AttachmentManager, FileStore, LocalFileStore, MemoryRecord, StagedUploads, UploadedFile,
};
use attachforge_common::SizeSpec;
use attachforge_imaging::{tools, Backend, BackendKind, ImageBackend};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Target};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "attachforge=debug,attachforge_imaging=debug".to_string()
        } else {
            "attachforge=warn,attachforge_imaging=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CheckBackends => check_backends(cli.config.as_deref()),
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Path { target, custom } => {
            print_path(&target, custom.as_deref(), cli.config.as_deref())
        }
        Commands::Attach { target, file, name } => {
            attach_file(&target, &file, name, cli.config.as_deref())
        }
        Commands::Show {
            target,
            style,
            json,
        } => show_attachment(&target, style.as_deref(), json, cli.config.as_deref()),
        Commands::Detach { target } => detach_file(&target, cli.config.as_deref()),
        Commands::Resize {
            input,
            output,
            size,
            backend,
        } => resize_file(&input, &output, &size, &backend, cli.config.as_deref()),
        Commands::Version => {
            println!("attachforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build_manager(config: &Config, name: &str) -> Result<AttachmentManager> {
    let attachment = match config.attachment(name) {
        Some(attachment) => attachment.clone(),
        None if name == "default" => AttachmentConfig::default(),
        None => anyhow::bail!("No attachment named '{}' in config", name),
    };

    let store = match &config.storage.root {
        Some(root) => LocalFileStore::with_root(root),
        None => LocalFileStore::new(),
    };

    AttachmentManager::new(attachment, store, StagedUploads::new(), &config.imaging)
        .with_context(|| format!("Failed to set up attachment '{}'", name))
}

fn load_record(path: &Path) -> Result<MemoryRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse record file: {:?}", path))
}

fn save_record(path: &Path, record: &MemoryRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write record file: {:?}", path))
}

fn check_backends(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let magick_path = config.imaging.magick_path.as_deref();

    println!("Checking imaging backends...\n");

    println!("✓ raster (built in: jpeg, png, gif)");

    for tool in tools::check_tools() {
        let status = if tool.available() { "✓" } else { "✗" };
        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    match Backend::select(config.imaging.backend, magick_path) {
        Ok(backend) => println!(
            "Selected backend ({}): {}",
            config.imaging.backend.as_str(),
            backend.name()
        ),
        Err(e) => println!(
            "No usable backend for '{}': {}",
            config.imaging.backend.as_str(),
            e
        ),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Imaging backend: {}", config.imaging.backend.as_str());
            println!("  Attachments: {}", config.attachments.len());
            for (name, attachment) in &config.attachments {
                println!(
                    "    {}: {} ({} styles, {} processors)",
                    name,
                    attachment.path,
                    attachment.styles.len(),
                    attachment.processors.len()
                );
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let attachment = AttachmentConfig::default();
            println!("Default attachment:");
            println!("  Path: {}", attachment.path);
            println!("  Folder: {}", attachment.folder);
            println!("  Attribute: {}", attachment.attribute);
        }
    }

    Ok(())
}

fn print_path(target: &Target, custom: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let manager = build_manager(&config, &target.attachment)?;
    let record = load_record(&target.record)?;

    println!("{}", manager.get_parsed_path(&record, custom)?);
    Ok(())
}

fn attach_file(
    target: &Target,
    file: &Path,
    name: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let mut manager = build_manager(&config, &target.attachment)?;
    let mut record = load_record(&target.record)?;

    let original_name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Cannot determine file name of {:?}", file))?,
    };

    // The upload is moved into place, so stage a copy next to the storage root.
    let staging_dir = manager.store().resolve("");
    let staging_dir = if staging_dir.as_os_str().is_empty() {
        Path::new(".").to_path_buf()
    } else {
        std::fs::create_dir_all(&staging_dir)?;
        staging_dir
    };
    let staged = tempfile::Builder::new()
        .prefix(".attachforge-")
        .tempfile_in(&staging_dir)
        .context("Failed to create staging file")?;
    std::fs::copy(file, staged.path())
        .with_context(|| format!("Failed to stage {:?}", file))?;

    let attribute = manager.config().attribute.clone();
    manager.uploads_mut().stage(
        record.type_name.as_str(),
        &attribute,
        UploadedFile::new(original_name, staged.path()),
    );

    let attachment = manager.after_save(&mut record)?;
    save_record(&target.record, &record)?;

    match attachment {
        Some(attachment) => {
            println!("Stored: {}", attachment.base_path);
            for (style, path) in &attachment.variant_paths {
                println!("  {}: {}", style, path);
            }
        }
        None => println!("Nothing to store."),
    }

    Ok(())
}

fn show_attachment(
    target: &Target,
    style: Option<&str>,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let manager = build_manager(&config, &target.attachment)?;
    let record = load_record(&target.record)?;

    if json {
        let value = serde_json::json!({
            "state": manager.state(&record),
            "path": manager.get_attachment(&record, style),
            "attachment": manager.attachment(&record),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let path = manager.get_attachment(&record, style);
    if path.is_empty() {
        println!("No attachment.");
    } else {
        println!("{}", path);
    }

    Ok(())
}

fn detach_file(target: &Target, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let manager = build_manager(&config, &target.attachment)?;
    let mut record = load_record(&target.record)?;

    let report = manager.delete_attachment(&mut record)?;
    save_record(&target.record, &record)?;

    println!("Removed {} file(s)", report.removed.len());
    for path in &report.removed {
        println!("  {}", path);
    }

    Ok(())
}

fn resize_file(
    input: &Path,
    output: &Path,
    size: &str,
    backend: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let config = config::load_config_or_default(config_path)?;
    let spec: SizeSpec = size.parse()?;
    let kind: BackendKind = backend.parse().map_err(anyhow::Error::msg)?;

    let backend = Backend::select(kind, config.imaging.magick_path.as_deref())?;
    let written = backend.resize(input, output, &spec)?;

    println!("{} -> {} ({}, {})", input.display(), output.display(), written, backend.name());
    Ok(())
}
