//! # Encarte CLI
//!
//! Command-line interface for generating promotional flyers.
//!
//! ## Usage
//!
//! ```bash
//! # List available templates
//! encarte templates
//!
//! # Write the spreadsheet template
//! encarte csv-template --out template_encartes_discar.csv
//!
//! # List or search products in a spreadsheet
//! encarte products produtos.csv --search brahma
//!
//! # Render a flyer
//! encarte render --csv produtos.csv --code 1234 --template moderno \
//!     --original 14,90 --promo 9,99 --format jpg --out-dir encartes/
//!
//! # Run the HTTP API
//! encarte serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use encarte::{
    EncarteError,
    catalog::{self, sample},
    config::AppConfig,
    export::{self, ExportFormat, OutboxShare, ShareOutcome, ShareTarget},
    flyer::{FlyerForm, ImageTransform},
    logging,
    render::{HttpImageLoader, Renderer},
    template::{self, TemplateId},
    workspace::Workspace,
};

/// Encarte - Promotional flyer generator
#[derive(Parser, Debug)]
#[command(name = "encarte")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directives (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = logging::DEFAULT_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available templates
    Templates,

    /// Print or save the CSV template
    CsvTemplate {
        /// Write to this file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// List products parsed from a spreadsheet
    Products {
        /// CSV/TSV file
        file: PathBuf,

        /// Filter by name or code
        #[arg(long)]
        search: Option<String>,
    },

    /// Render a flyer and save it
    Render {
        /// CSV/TSV file with the products
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,

        /// Product code
        #[arg(long)]
        code: String,

        /// Template id (moderno, classico, minimalista, branco, escuro, destaque)
        #[arg(long, default_value = "moderno")]
        template: String,

        /// Original price, e.g. 14,90
        #[arg(long)]
        original: String,

        /// Promotional price, e.g. 9,99
        #[arg(long)]
        promo: String,

        /// Additional information shown under the price
        #[arg(long)]
        info: Option<String>,

        /// Validity date, e.g. 2026-12-31
        #[arg(long)]
        validity: Option<String>,

        /// Clip the product image to a circle
        #[arg(long)]
        remove_background: bool,

        /// Image scale (0.1 to 3.0)
        #[arg(long, default_value = "1.0")]
        scale: f32,

        /// Horizontal image offset in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset_x: f32,

        /// Vertical image offset in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset_y: f32,

        /// Image rotation in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        rotation: f32,

        /// Output format (png or jpg)
        #[arg(long, default_value = "png")]
        format: String,

        /// Directory for the generated file
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Also share into this outbox directory
        #[arg(long, value_name = "DIR")]
        share_dir: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        listen: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EncarteError> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Templates => {
            println!("Available templates:");
            for t in template::all() {
                println!("  {:<12} {:<12} {}", t.id, t.name, t.description);
            }
        }

        Commands::CsvTemplate { out } => {
            let csv = sample::template_csv();
            match out {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Saved to {}", path.display());
                }
                None => print!("{}", csv),
            }
        }

        Commands::Products { file, search } => {
            let products = read_catalog(&file)?;
            let found = catalog::search(&products, search.as_deref().unwrap_or(""));
            for p in &found {
                println!("{:<10} {:<40} {}", p.code, p.name, p.image_url);
            }
            println!("\n{} of {} products", found.len(), products.len());
        }

        Commands::Render {
            csv,
            code,
            template,
            original,
            promo,
            info,
            validity,
            remove_background,
            scale,
            offset_x,
            offset_y,
            rotation,
            format,
            out_dir,
            share_dir,
        } => {
            let template: TemplateId = template.parse()?;
            let format: ExportFormat = format.parse()?;
            let transform = ImageTransform {
                scale,
                x: offset_x,
                y: offset_y,
                rotation,
            };
            let form = FlyerForm {
                product_code: code,
                original_price: original,
                promo_price: promo,
                additional_info: info,
                validity,
                remove_background,
                image_transform: (!transform.is_identity()).then_some(transform),
            };

            let mut workspace = Workspace::new();
            let bytes = std::fs::read(&csv)?;
            workspace.load_upload(&csv.to_string_lossy(), &bytes)?;
            workspace.select_template(template);
            let spec = workspace.submit(&form)?;

            println!(
                "Generating {} flyer for {} ({}% off)...",
                template,
                spec.product().name,
                spec.discount_percent()
            );

            let renderer = Renderer::from_config(&config.render, config.branding.clone())?;
            let loader = HttpImageLoader::allowing_local(config.render.image_timeout())?
                .with_cache_limit(config.render.image_cache_entries);
            let runtime = tokio::runtime::Runtime::new()?;
            let flyer = runtime.block_on(workspace.render(&renderer, &loader))?;
            if !flyer.image_loaded {
                println!("Imagem não disponível, using placeholder");
            }

            let file = export::export(&flyer, format, config.render.jpeg_quality)?;
            let path = file.save_to(&out_dir)?;
            println!("Saved to {}", path.display());

            if let Some(dir) = share_dir {
                let target = OutboxShare::new(dir);
                match export::share(&flyer, renderer.branding(), Some(&target as &dyn ShareTarget))? {
                    ShareOutcome::Shared => println!("Shared to outbox"),
                    ShareOutcome::Downloaded { file, reason } => {
                        let path = file.save_to(&out_dir)?;
                        println!("Share failed ({}), saved {} instead", reason, path.display());
                    }
                }
            }
        }

        Commands::Serve { listen } => {
            if let Some(addr) = listen {
                config.server.listen_addr = addr;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(encarte::server::serve(config))?;
        }
    }

    Ok(())
}

fn read_catalog(path: &Path) -> Result<Vec<catalog::Product>, EncarteError> {
    let bytes = std::fs::read(path)?;
    catalog::upload::load_upload(&path.to_string_lossy(), &bytes)
}
