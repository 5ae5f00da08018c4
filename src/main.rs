use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sidebar_resolve::config::{Document, parse_document_file};
use sidebar_resolve::resolve::{Viewer, flatten_config, matches};

#[derive(Parser)]
#[command(name = "sidebar-resolve")]
#[command(
	author,
	version,
	about = "Resolve sidebar customization documents into per-viewer configurations"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Log resolution steps to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the effective configuration for a viewer as JSON
	Resolve {
		/// Document to resolve (.toml, .yaml, .yml or .json)
		document: PathBuf,

		#[command(flatten)]
		viewer: ViewerArgs,

		/// Print JSON on a single line
		#[arg(long)]
		compact: bool,
	},
	/// Check a document for parse errors and circular references
	Validate {
		/// Document to validate
		document: PathBuf,
	},
	/// List the document's exceptions and whether each matches a viewer
	Exceptions {
		/// Document to inspect
		document: PathBuf,

		#[command(flatten)]
		viewer: ViewerArgs,
	},
}

#[derive(Args)]
struct ViewerArgs {
	/// Viewer's user name
	#[arg(long, default_value = "")]
	user: String,

	/// Viewer is an administrator
	#[arg(long)]
	admin: bool,

	/// Viewer is the owner
	#[arg(long)]
	owner: bool,

	/// Viewer's user agent string
	#[arg(long, default_value = "")]
	user_agent: String,
}

impl ViewerArgs {
	fn to_viewer(&self) -> Viewer {
		Viewer {
			name: self.user.clone(),
			is_admin: self.admin,
			is_owner: self.owner,
			user_agent: self.user_agent.clone(),
		}
	}
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	if let Err(e) = sidebar_resolve::logging::init(cli.verbose) {
		eprintln!("Warning: failed to initialize logging: {}", e);
	}

	match cli.command {
		Commands::Resolve {
			document,
			viewer,
			compact,
		} => handle_resolve(&document, &viewer.to_viewer(), compact),
		Commands::Validate { document } => handle_validate(&document),
		Commands::Exceptions { document, viewer } => {
			handle_exceptions(&document, &viewer.to_viewer())
		}
	}
}

fn load(path: &Path) -> Result<Document> {
	parse_document_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn handle_resolve(path: &Path, viewer: &Viewer, compact: bool) -> Result<ExitCode> {
	let document = load(path)?;
	let config = flatten_config(&document, viewer).context("Failed to resolve document")?;

	let output = if compact {
		serde_json::to_string(&config)
	} else {
		serde_json::to_string_pretty(&config)
	}
	.context("Failed to serialize effective configuration")?;

	println!("{}", output);
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(path: &Path) -> Result<ExitCode> {
	match parse_document_file(path) {
		Ok(document) => {
			println!("Document is valid: {}", path.display());
			if let Some(ref id) = document.id {
				println!("  id: {}", id);
			}
			println!("  options: {}", document.fragment.options.present_count());
			println!("  order entries: {}", document.fragment.order.len());
			println!("  exceptions: {}", document.exceptions.len());
			println!(
				"  extendable configs: {}",
				document.extendable_configs.len()
			);
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Document error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_exceptions(path: &Path, viewer: &Viewer) -> Result<ExitCode> {
	let document = load(path)?;

	if document.exceptions.is_empty() {
		println!("No exceptions defined.");
		return Ok(ExitCode::SUCCESS);
	}

	for (i, exception) in document.exceptions.iter().enumerate() {
		let status = if matches(exception, viewer) {
			"matches"
		} else {
			"no match"
		};
		println!("Exception {}: {}", i + 1, status);

		let matchers = &exception.matchers;
		let predicates = [
			("user", &matchers.user),
			("not_user", &matchers.not_user),
			("device", &matchers.device),
			("not_device", &matchers.not_device),
			("is_admin", &matchers.is_admin),
			("is_owner", &matchers.is_owner),
		];
		for (name, value) in predicates {
			if let Some(value) = value {
				println!("    {}: {}", name, value);
			}
		}
		println!("    matchers_conditions: {:?}", exception.matchers_conditions);
		if let Some(ref extend_from) = exception.extend_from {
			println!("    extend_from: {}", extend_from.names().join(", "));
		}
	}

	Ok(ExitCode::SUCCESS)
}
