use std::path::PathBuf;

use clap::{Parser, Subcommand};

use page_mounts::config::{load_config, MountsConfig};
use page_mounts::lifecycle::{build_mount_table, build_page_registry};
use page_mounts::page::{InMemoryPageStore, PageType};
use page_mounts::request::{BookmarkablePageTarget, PageParameters, RequestParameters};
use page_mounts::routing::MountTable;

#[derive(Parser)]
#[command(name = "mount-cli")]
#[command(about = "Inspect and exercise a page-mounts config offline", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "mounts.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mounts in lookup order
    Mounts,
    /// Validate the config and build every mount
    Check,
    /// Decode a URL into a request target
    Decode {
        /// URL path and query, e.g. `/blog/2024/hello?ref=feed`
        url: String,
    },
    /// Encode a bookmarkable page target into a URL
    Encode {
        /// Page type, e.g. `blog.Article`
        #[arg(short, long)]
        page: String,

        /// Parameter as `key=value`; repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        #[arg(long)]
        page_map: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let table = build_table(&config)?;

    match cli.command {
        Commands::Mounts => {
            println!("{}", serde_json::to_string_pretty(&table.list())?);
        }
        Commands::Check => {
            println!(
                "{}: {} pages, {} mounts OK",
                cli.config.display(),
                config.pages.len(),
                table.len()
            );
        }
        Commands::Decode { url } => {
            let mut request = RequestParameters::from_url(&url);
            match table.target_for_request(&mut request, &InMemoryPageStore::default())? {
                Some(target) => println!("{target}"),
                None => println!("no mount handles {url}"),
            }
        }
        Commands::Encode {
            page,
            params,
            page_map,
        } => {
            let parameters: PageParameters = params.into_iter().collect();
            let target = BookmarkablePageTarget::new(PageType::new(page), parameters)
                .with_page_map(page_map);
            match table.path_for_target(&target.into())? {
                Some(url) => println!("{url}"),
                None => println!("no mount encodes this page"),
            }
        }
    }

    Ok(())
}

fn build_table(config: &MountsConfig) -> Result<MountTable, Box<dyn std::error::Error>> {
    let registry = build_page_registry(&config.pages)?;
    Ok(build_mount_table(config, &registry)?)
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}
