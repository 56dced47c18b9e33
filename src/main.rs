//! docpath - Entry Point
//!
//! Command-line access to a local directory exposed as a granted document
//! tree, addressed by encoded paths.

use clap::{Parser, Subcommand};
use log::{debug, info};
use std::io::{self, Read, Write};
use std::process;

use docpath::config::{AppConfig, DEFAULT_CONFIG_FILE};
use docpath::error::handlers::{exit_code, handle_error};
use docpath::error::{DocpathError, StorageError};
use docpath::path::{EncodedPath, SCHEME_PREFIX, encode_root};
use docpath::provider::LocalProvider;
use docpath::storage::{FileData, TreeFs};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file, extension optional
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    /// Print the encoded root path of the configured tree
    Root,
    /// Check whether a directory exists
    Exists { path: String },
    /// Show size, type and modification time
    Stat { path: String },
    /// List a directory (the tree root by default)
    Ls { path: Option<String> },
    /// Print a file
    Cat {
        path: String,
        /// Decode as text: utf8, utf16 or ascii
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Write a file from --data or standard input
    Write {
        path: String,
        /// Content to write; standard input is used when absent
        #[arg(long)]
        data: Option<String>,
        /// Encode text as: utf8, utf16 or ascii
        #[arg(long)]
        encoding: Option<String>,
        /// Create missing parent directories
        #[arg(short = 'p', long)]
        recursive: bool,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parent directories
        #[arg(short = 'p', long)]
        recursive: bool,
    },
    /// Delete a file or directory
    Rm { path: String },
    /// Rename an entry within its directory
    Mv { from: String, to: String },
    /// Copy an entry (not supported)
    Cp { from: String, to: String },
}

fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        handle_error(&e);
        eprintln!("{}", e);
        process::exit(exit_code(&e));
    }
}

fn run(args: Args) -> Result<(), DocpathError> {
    let config = AppConfig::load_from(&args.config)?;
    let root = encode_root(&config.grant())?;
    info!("Tree {} at {} (root path {})", config.authority, config.root_dir, root);
    let fs: TreeFs<LocalProvider> = TreeFs::new(config.provider());

    match args.command {
        Commands::Root => println!("{}", root),
        Commands::Exists { path } => {
            let exists = fs.dir_exists(&expand(&root, &path));
            println!("{}", exists);
        }
        Commands::Stat { path } => {
            let stat = fs.stat(&expand(&root, &path))?;
            println!("name:  {}", stat.name);
            println!("type:  {}", stat.kind);
            println!("mime:  {}", stat.mime_type);
            println!("size:  {}", stat.size_bytes);
            println!("mtime: {}", stat.last_modified_millis);
            println!("path:  {}", stat.path);
        }
        Commands::Ls { path } => {
            let path = path.map_or_else(|| root.to_string(), |p| expand(&root, &p));
            for entry in fs.list_dir(&path)? {
                let display = entry
                    .path
                    .as_ref()
                    .map_or_else(|| "<unaddressable>".to_string(), EncodedPath::to_string);
                println!(
                    "{:<9} {:>10} {:>14} {}",
                    entry.kind.as_str(),
                    entry.size_bytes,
                    entry.last_modified_millis,
                    display
                );
            }
        }
        Commands::Cat { path, encoding } => {
            let data = fs.read_file(&expand(&root, &path), encoding.as_deref())?;
            let mut stdout = io::stdout().lock();
            let result = match &data {
                FileData::Text(text) => stdout.write_all(text.as_bytes()),
                FileData::Bytes(bytes) => stdout.write_all(bytes),
            };
            result.map_err(StorageError::from)?;
        }
        Commands::Write {
            path,
            data,
            encoding,
            recursive,
        } => {
            let data = match data {
                Some(text) => FileData::Text(text),
                None => read_stdin(encoding.is_some())?,
            };
            let written =
                fs.write_file(&expand(&root, &path), &data, encoding.as_deref(), recursive)?;
            println!("{}", written);
        }
        Commands::Mkdir { path, recursive } => fs.mkdir(&expand(&root, &path), recursive)?,
        Commands::Rm { path } => fs.delete(&expand(&root, &path))?,
        Commands::Mv { from, to } => {
            let renamed = fs.rename(&expand(&root, &from), &expand(&root, &to))?;
            println!("{}", renamed);
        }
        Commands::Cp { from, to } => {
            fs.copy(&expand(&root, &from), &expand(&root, &to))?;
        }
    }

    Ok(())
}

/// Encoded paths pass through; anything else is taken relative to the root
fn expand(root: &EncodedPath, arg: &str) -> String {
    if arg.starts_with(SCHEME_PREFIX) {
        return arg.to_string();
    }
    let relative = arg.trim_matches('/');
    let expanded = if relative.is_empty() {
        root.to_string()
    } else {
        format!("{}/{}", root, relative)
    };
    debug!("expanded {:?} to {}", arg, expanded);
    expanded
}

fn read_stdin(as_text: bool) -> Result<FileData, StorageError> {
    let mut bytes = Vec::new();
    io::stdin().lock().read_to_end(&mut bytes)?;
    Ok(if as_text {
        FileData::Text(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        FileData::Bytes(bytes)
    })
}
