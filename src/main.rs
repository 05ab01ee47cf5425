use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::catalog::PgCatalog;
use crate::error::Result;
use crate::options::{Options, RelationPatterns};
use crate::snapshot::CatalogSnapshot;

mod catalog;
mod error;
mod ident;
mod metadata;
mod objects;
mod options;
mod predata;
mod relations;
mod snapshot;
mod verify;

#[derive(Parser)]
#[clap(version, about = "Relation selection and predata definitions for selective backups")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve include or exclude patterns into qualified relation names
    Tables(TablesArgs),
    /// Write schema, language and constraint definitions from a catalog snapshot
    Predata(PredataArgs),
}

#[derive(Args)]
struct TablesArgs {
    /// Relation to back up, as schema.table (repeatable)
    #[clap(long, value_name = "SCHEMA.TABLE", conflicts_with_all = &["exclude-table", "exclude-table-file"])]
    include_table: Vec<String>,
    /// File with one schema.table per line, read after --include-table
    #[clap(long, parse(from_os_str), conflicts_with_all = &["exclude-table", "exclude-table-file"])]
    include_table_file: Option<PathBuf>,
    /// Relation to leave out, as schema.table (repeatable)
    #[clap(name = "exclude-table", long, value_name = "SCHEMA.TABLE")]
    exclude_table: Vec<String>,
    /// File with one schema.table per line, read after --exclude-table
    #[clap(name = "exclude-table-file", long, parse(from_os_str))]
    exclude_table_file: Option<PathBuf>,
    /// Rewrite each name with the server's quote_ident()
    #[clap(long, requires = "dbconn")]
    quote: bool,
    /// libpq style connection string
    #[clap(long, env = "PGPREDATA_DBCONN")]
    dbconn: Option<String>,
}

#[derive(Args)]
struct PredataArgs {
    /// JSON catalog snapshot
    #[clap(short, long, parse(from_os_str))]
    snapshot: PathBuf,
    /// Output file, stdout when omitted
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Parse the generated definitions before writing them
    #[clap(long)]
    verify: bool,
}

fn main() {
    let args: Cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let result = match args.command {
        Command::Tables(args) => tables(args),
        Command::Predata(args) => predata(args),
    };
    if let Err(err) = result {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn tables(args: TablesArgs) -> Result<()> {
    let include = RelationPatterns {
        patterns: args.include_table,
        file: args.include_table_file,
    };
    let exclude = RelationPatterns {
        patterns: args.exclude_table,
        file: args.exclude_table_file,
    };
    let options = Options::new(&include, &exclude)?;

    let (selection, selected) = options.selected_tables();
    tracing::info!("Printing {} {selection} relation(s)", selected.len());

    let names = match args.dbconn.filter(|_| args.quote) {
        Some(conninfo) => {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            runtime.block_on(async {
                let catalog = PgCatalog::connect(&conninfo).await?;
                catalog::canonicalize(&catalog, selected).await
            })?
        }
        None => selected.iter().map(ToString::to_string).collect(),
    };

    let mut stdout = io::stdout().lock();
    for name in names {
        writeln!(stdout, "{name}")?;
    }
    Ok(())
}

fn predata(args: PredataArgs) -> Result<()> {
    tracing::info!("Reading catalog snapshot: {:?}", args.snapshot);
    let snapshot = CatalogSnapshot::load(&args.snapshot)?;

    // render fully first so a failure leaves no partial script behind
    let mut script = Vec::new();
    snapshot.write_predata(&mut script)?;

    if args.verify {
        verify::verify(&String::from_utf8_lossy(&script))?;
    }

    match args.output {
        Some(path) => File::create(path)?.write_all(&script)?,
        None => io::stdout().lock().write_all(&script)?,
    }
    Ok(())
}
