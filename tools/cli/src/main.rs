//! Photogate CLI - Command line access to the Photogate backend.
//!
//! Signs in through the browser, manages Drive files and runs ID photo
//! compliance checks from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

use photogate_client::auth::{BrowserNavigator, FileRedirectStore};
use photogate_client::drive::mime_for_name;
use photogate_client::{
    AuthFlow, ClientConfig, ComplianceOptions, DriveFile, Gateway, ImageBlob, ImageSource,
    RedirectOutcome, UploadFile,
};
use photogate_common::FileId;
use photogate_shell::{PresetDialog, ShellHandler, ShellRequest};

#[derive(Parser)]
#[command(name = "photogate")]
#[command(about = "Photogate - ID photo compliance and Google Drive gateway")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to a JSON client configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and PHOTOGATE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show authentication status.
    Status,

    /// Sign in with Google in the system browser.
    Login {
        /// Ask the backend for a fresh consent screen.
        #[arg(short, long)]
        force: bool,

        /// Clear stored tokens before signing in.
        #[arg(long, conflicts_with = "force")]
        clear: bool,

        /// Location to come back to after sign-in (default: the API URL).
        #[arg(long)]
        return_to: Option<String>,
    },

    /// Complete sign-in from the URL the browser landed on.
    Callback {
        /// Full callback URL including its query string.
        url: String,
    },

    /// Sign out.
    Logout,

    /// Ask the backend to refresh the stored Google tokens.
    FixTokens,

    /// Google Drive operations.
    #[command(subcommand)]
    Drive(DriveCommands),

    /// Check an image for ID photo compliance.
    Check {
        /// Local file, http(s) URL, data URL or bare base64.
        image: String,

        /// Colour the background was replaced with.
        #[arg(short, long)]
        background_color: Option<String>,
    },

    /// Check that the backend is reachable.
    Ping,

    /// Run a native shell request.
    #[command(subcommand)]
    Shell(ShellCommands),
}

#[derive(Subcommand)]
enum DriveCommands {
    /// Show Drive connection status.
    Status,

    /// List files in a folder.
    List {
        /// Folder ID (default: root).
        #[arg(short, long)]
        folder: Option<String>,

        /// Only list images.
        #[arg(short, long)]
        images: bool,
    },

    /// Upload a local file.
    Upload {
        /// File to upload.
        source: PathBuf,

        /// Destination folder ID.
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Replace the content of an existing file.
    Update {
        /// Drive file ID.
        id: String,

        /// New content.
        source: PathBuf,

        /// Rename the file as well.
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Create a folder.
    Mkdir {
        /// Folder name.
        name: String,

        /// Parent folder ID.
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Download a file.
    Download {
        /// Drive file ID.
        id: String,

        /// Destination file path.
        dest: PathBuf,

        /// Download the thumbnail instead of the full content.
        #[arg(short, long)]
        thumbnail: bool,
    },

    /// Show file metadata.
    Details {
        /// Drive file ID.
        id: String,
    },

    /// Test the Drive connection.
    Test,

    /// Disconnect Drive.
    Logout,
}

#[derive(Subcommand)]
enum ShellCommands {
    /// Save a local image through the save-image channel.
    Save {
        /// Image to save.
        source: PathBuf,

        /// Destination chosen in place of the dialog.
        #[arg(short, long)]
        to: PathBuf,
    },

    /// Open an image through the open-image channel.
    Open {
        /// Image chosen in place of the dialog.
        path: PathBuf,
    },

    /// Print the application version.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config;
    let api_url = cli.api_url;
    let connect = || -> Result<Gateway> {
        let config = resolve_config(config_path.as_deref(), api_url.as_deref())?;
        debug!("Using backend at {}", config.base_url);
        Gateway::new(config).context("Failed to create backend client")
    };

    match cli.command {
        Commands::Status => cmd_status(&connect()?).await,

        Commands::Login {
            force,
            clear,
            return_to,
        } => cmd_login(&connect()?, force, clear, return_to.as_deref()).await,

        Commands::Callback { url } => cmd_callback(&connect()?, &url),

        Commands::Logout => cmd_logout(&connect()?).await,

        Commands::FixTokens => cmd_fix_tokens(&connect()?).await,

        Commands::Drive(command) => cmd_drive(&connect()?, command).await,

        Commands::Check {
            image,
            background_color,
        } => cmd_check(&connect()?, &image, background_color).await,

        Commands::Ping => cmd_ping(&connect()?).await,

        Commands::Shell(command) => cmd_shell(command).await,
    }
}

/// Build the client configuration: file (or defaults), then environment,
/// then the command line.
fn resolve_config(path: Option<&Path>, api_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path).context("Failed to load configuration")?,
        None => ClientConfig::default(),
    }
    .with_env_overrides();

    if let Some(url) = api_url {
        config.base_url = url.to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn file_id(raw: &str) -> Result<FileId> {
    FileId::new(raw).context("Invalid file ID")
}

fn optional_file_id(raw: Option<&str>) -> Result<Option<FileId>> {
    raw.map(file_id).transpose()
}

fn auth_flow(gateway: &Gateway) -> Result<AuthFlow> {
    let store = FileRedirectStore::default_location().context("Failed to locate sign-in state")?;
    Ok(AuthFlow::new(
        gateway.auth(),
        Arc::new(store),
        Arc::new(BrowserNavigator::new()),
    ))
}

/// Show authentication status.
async fn cmd_status(gateway: &Gateway) -> Result<()> {
    let status = gateway.auth().get_status().await;

    if status.authenticated {
        println!("Signed in.");
    } else {
        println!("Not signed in.");
    }
    if let Some(message) = status.message {
        println!("  {}", message);
    }

    Ok(())
}

/// Start the browser sign-in.
async fn cmd_login(
    gateway: &Gateway,
    force: bool,
    clear: bool,
    return_to: Option<&str>,
) -> Result<()> {
    let flow = auth_flow(gateway)?;
    let current = match return_to {
        Some(raw) => Url::parse(raw).context("Invalid return location")?,
        None => gateway
            .config()
            .parsed_base_url()
            .context("Invalid API URL")?,
    };

    info!("Starting sign-in, returning to {}", current);
    let result = if force {
        flow.force_new_login(&current).await
    } else if clear {
        flow.sign_in(&current).await
    } else {
        flow.initiate_login(&current).await
    };

    if !result.success {
        anyhow::bail!(
            "Sign-in failed: {}",
            result.message.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("Browser opened for sign-in.");
    println!("When it lands back, run: photogate callback '<url>'");

    Ok(())
}

/// Finish sign-in from the callback URL.
fn cmd_callback(gateway: &Gateway, raw: &str) -> Result<()> {
    let flow = auth_flow(gateway)?;
    let url = Url::parse(raw).context("Invalid callback URL")?;

    match flow
        .handle_auth_redirect(&url)
        .context("Failed to process callback")?
    {
        None => println!("No sign-in result in that URL."),
        Some(RedirectOutcome::Failed { error, message }) => {
            anyhow::bail!("Sign-in failed ({}): {}", error, message);
        }
        Some(RedirectOutcome::Succeeded {
            returned_to,
            forced,
        }) => {
            println!("Signed in successfully!");
            if forced {
                println!("  A new Google session was created.");
            }
            if let Some(location) = returned_to {
                println!("  Returned to: {}", location);
            }
        }
    }

    Ok(())
}

/// Sign out.
async fn cmd_logout(gateway: &Gateway) -> Result<()> {
    let result = gateway.auth().logout().await;

    if !result.success {
        anyhow::bail!(
            "Logout failed: {}",
            result.message.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("Signed out.");
    Ok(())
}

/// Refresh stored tokens.
async fn cmd_fix_tokens(gateway: &Gateway) -> Result<()> {
    let result = gateway
        .auth()
        .fix_tokens()
        .await
        .context("Failed to refresh tokens")?;

    if !result.success {
        anyhow::bail!(
            "Token refresh failed: {}",
            result.message.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("{}", result.message.unwrap_or_else(|| "Tokens refreshed.".to_string()));
    Ok(())
}

async fn cmd_drive(gateway: &Gateway, command: DriveCommands) -> Result<()> {
    let drive = gateway.drive();

    match command {
        DriveCommands::Status => {
            let status = drive.get_status().await;
            println!(
                "Drive: {}",
                if status.connected {
                    "connected"
                } else {
                    "not connected"
                }
            );
            if status.login_required {
                println!("  Sign in first: photogate login");
            }
            if let Some(message) = status.message {
                println!("  {}", message);
            }
        }

        DriveCommands::List { folder, images } => {
            let folder = optional_file_id(folder.as_deref())?;
            let listing = drive
                .list_files(folder.as_ref(), images)
                .await
                .context("Failed to list files")?;

            if listing.files.is_empty() {
                println!("Folder is empty.");
            } else {
                for file in &listing.files {
                    print_entry(file);
                }
            }
        }

        DriveCommands::Upload { source, folder } => {
            info!("Uploading {}", source.display());
            let folder = optional_file_id(folder.as_deref())?;
            let file = UploadFile::from_path(&source)
                .await
                .context("Failed to read source file")?;
            let size = file.bytes.len();

            let receipt = drive
                .upload_file(file, folder.as_ref())
                .await
                .context("Failed to upload file")?;

            println!(
                "File uploaded: {} ({} bytes)",
                receipt.file_name.as_deref().unwrap_or("?"),
                size
            );
            if let Some(id) = receipt.file_id {
                println!("  ID: {}", id);
            }
            if let Some(link) = receipt.web_view_link {
                println!("  Link: {}", link);
            }
        }

        DriveCommands::Update { id, source, name } => {
            let id = file_id(&id)?;
            let file = UploadFile::from_path(&source)
                .await
                .context("Failed to read source file")?;

            let outcome = drive
                .update_file(&id, file, name.as_deref())
                .await
                .context("Failed to update file")?;

            if outcome.created_new_file {
                println!("Created a new file instead: {} ({})", outcome.file.name, outcome.file.id);
                if let Some(message) = outcome.message {
                    println!("  {}", message);
                }
            } else {
                println!("File updated: {}", outcome.file.name);
            }
        }

        DriveCommands::Mkdir { name, parent } => {
            let parent = optional_file_id(parent.as_deref())?;
            let folder = drive
                .create_folder(&name, parent.as_ref())
                .await
                .context("Failed to create folder")?;
            println!("Folder created: {} ({})", folder.name, folder.id);
        }

        DriveCommands::Download {
            id,
            dest,
            thumbnail,
        } => {
            let id = file_id(&id)?;
            let content = if thumbnail {
                drive.get_thumbnail(&id).await
            } else {
                drive.get_file_content(&id).await
            }
            .context("Failed to download file")?;

            let bytes = content.decode().context("Failed to decode file content")?;
            tokio::fs::write(&dest, &bytes)
                .await
                .context("Failed to write output file")?;

            println!(
                "File downloaded: {} ({} bytes)",
                dest.display(),
                bytes.len()
            );
        }

        DriveCommands::Details { id } => {
            let id = file_id(&id)?;
            let file = drive
                .get_file_details(&id)
                .await
                .context("Failed to get file details")?;

            println!("File Information:");
            println!("  ID: {}", file.id);
            println!("  Name: {}", file.name);
            println!("  Type: {}", file.mime_type);
            if let Some(size) = file.size_bytes() {
                println!("  Size: {} bytes", size);
            }
            if let Some(parent) = file.parent() {
                println!("  Parent: {}", parent);
            }
            if let Some(modified) = file.modified_time {
                println!("  Modified: {}", modified);
            }
            if let Some(link) = &file.web_view_link {
                println!("  Link: {}", link);
            }
        }

        DriveCommands::Test => {
            let test = drive
                .test_connection()
                .await
                .context("Failed to test connection")?;

            if test.login_required {
                println!("Not signed in. Run: photogate login");
            } else if test.connection_successful {
                match test.file_count {
                    Some(count) => println!("Connection OK ({} files visible)", count),
                    None => println!("Connection OK"),
                }
            } else {
                println!(
                    "Connection failed: {}",
                    test.message.as_deref().unwrap_or("unknown error")
                );
            }
        }

        DriveCommands::Logout => {
            let result = drive.logout().await.context("Failed to disconnect Drive")?;
            println!(
                "{}",
                result
                    .message
                    .unwrap_or_else(|| "Drive disconnected.".to_string())
            );
        }
    }

    Ok(())
}

fn print_entry(file: &DriveFile) {
    if file.is_folder() {
        println!("  [DIR]  {}/  ({})", file.name, file.id);
    } else {
        let size_str = file
            .size_bytes()
            .map(|s| format!("{} bytes", s))
            .unwrap_or_default();
        println!("  [FILE] {} ({})  ({})", file.name, size_str, file.id);
    }
}

/// Turn the `check` argument into an image source. Existing local files are
/// read; anything else goes to the normalizer as text.
async fn image_source(raw: &str) -> Result<ImageSource> {
    let path = Path::new(raw);
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let bytes = tokio::fs::read(path)
            .await
            .context("Failed to read image file")?;
        return Ok(ImageSource::Blob(ImageBlob::new(bytes, mime_for_name(raw))));
    }
    Ok(ImageSource::Text(raw.to_string()))
}

/// Run a compliance check.
async fn cmd_check(gateway: &Gateway, image: &str, background_color: Option<String>) -> Result<()> {
    let source = image_source(image).await?;
    let options = match background_color {
        Some(color) => ComplianceOptions::with_replaced_background(Some(color)),
        None => ComplianceOptions::default(),
    };

    let result = gateway.compliance().check_source(source, &options).await;

    if result.compliant {
        println!("Image is compliant.");
    } else {
        println!("Image is not compliant.");
    }
    if !result.message.is_empty() {
        println!("  {}", result.message);
    }
    for issue in &result.issues {
        println!("  - {}", issue);
    }

    Ok(())
}

/// Check backend reachability.
async fn cmd_ping(gateway: &Gateway) -> Result<()> {
    if !gateway.compliance().ping().await {
        anyhow::bail!("Backend at {} is not reachable", gateway.config().base_url);
    }
    println!("Backend at {} is up.", gateway.config().base_url);
    Ok(())
}

/// Run a shell channel with the dialog answered from the command line.
async fn cmd_shell(command: ShellCommands) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let (dialog, request) = match command {
        ShellCommands::Save { source, to } => {
            let buffer = tokio::fs::read(&source)
                .await
                .context("Failed to read source file")?;
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image.jpg".to_string());
            (
                PresetDialog::saving_to(to),
                ShellRequest::SaveImage {
                    buffer,
                    file_name,
                    default_path: None,
                },
            )
        }
        ShellCommands::Open { path } => (PresetDialog::opening(path), ShellRequest::OpenImage),
        ShellCommands::Version => (PresetDialog::canceled(), ShellRequest::GetAppVersion),
    };

    let handler = ShellHandler::new(dialog, version);
    let response = handler.handle(request).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to encode response")?
    );
    if !response.success {
        anyhow::bail!(
            "Shell request failed: {}",
            response.reason.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}
