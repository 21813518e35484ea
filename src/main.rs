use clap::{Parser, Subcommand};
use kg_pages::{config, load, output, resolve, site, templates};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("KG_PAGES_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("KG_PAGES_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "kg-pages")]
#[command(about = "Build static pages from Knowledge Graph stream documents")]
#[command(long_about = "\
Build static pages from Knowledge Graph stream documents

Each template declares a stream (entity types, optional entity ids,
locales, fields) and turns every matching document into one page.

Templates:

  help-article   /help/{id}   public, renders both rich-text fields
  secure-admin   /secure      gated to the document's authorized identities

Documents are read from *.json files under --documents (one document or
an array per file). A config.toml in the same directory is optional; run
'kg-pages gen-config' to print a documented one.

Set KG_PAGES_LOG (e.g. KG_PAGES_LOG=kg_pages=debug) for diagnostics.")]
#[command(version = version_string())]
struct Cli {
    /// Directory of stream documents
    #[arg(long, default_value = "documents", global = true)]
    documents: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve every template and write the site
    Build,
    /// Resolve every template without writing anything
    Check,
    /// Show every resolver output for one document
    Resolve {
        /// Template name (see `streams`)
        template: String,
        /// Document id
        id: String,
        /// Locale (defaults to the stream's first locale)
        #[arg(long)]
        locale: Option<String>,
    },
    /// List the stream declaration of every template
    Streams,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KG_PAGES_LOG")
                .unwrap_or_else(|_| "kg_pages=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.documents)?;
            init_thread_pool(&site_config.processing);
            println!("==> Loading {}", cli.documents.display());
            let loaded = load::load_documents(&cli.documents)?;
            output::print_load_output(&loaded);

            println!("==> Generating → {}", cli.output.display());
            let manifest = site::build(
                &templates::all(),
                &load::documents(&loaded),
                &site_config,
                &cli.output,
            )?;
            output::print_build_output(&manifest);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.documents)?;
            init_thread_pool(&site_config.processing);
            println!("==> Checking {}", cli.documents.display());
            let loaded = load::load_documents(&cli.documents)?;
            let manifest =
                site::resolve_site(&templates::all(), &load::documents(&loaded), &site_config)?;
            output::print_build_output(&manifest);
            println!("==> Documents are valid");
        }
        Command::Resolve {
            template,
            id,
            locale,
        } => {
            let site_config = config::load_config(&cli.documents)?;
            let template = templates::find(&template)
                .ok_or_else(|| format!("unknown template '{template}'"))?;
            let loaded = load::load_documents(&cli.documents)?;
            let page = resolve::resolve_document(
                template.as_ref(),
                &load::documents(&loaded),
                &id,
                locale.as_deref(),
                site_config.site.output_layout,
            )?;
            output::print_page_detail(&page);
        }
        Command::Streams => {
            output::print_streams(&templates::all());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
