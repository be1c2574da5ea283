use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tabload::{
    logging::init_logging,
    store::{describe_table, ensure_store, fetch_rows, head},
    AppConfig,
};

#[derive(Parser)]
#[command(author, version, about = "Print rows from the loaded table")]
struct Args {
    /// Number of rows to show.
    #[arg(short = 'n', long, default_value_t = 10)]
    rows: usize,
    /// Read-only SQL to run instead of the default `SELECT *`.
    #[arg(short, long)]
    query: Option<String>,
    /// Print column names and types instead of rows.
    #[arg(long)]
    schema: bool,
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging("warn");
    let args = Args::parse();
    let cfg = AppConfig::load(args.config.as_deref())?;
    let conn = ensure_store(&cfg.store, &cfg.loader)?;

    if args.schema {
        for (name, ty) in describe_table(&conn, &cfg.loader.table)? {
            let ty = ty.map(|t| t.to_string()).unwrap_or_else(|| "?".into());
            println!("{:<32} {}", name, ty);
        }
        return Ok(());
    }

    let result = match &args.query {
        Some(sql) => fetch_rows(&conn, sql, Some(args.rows))?,
        None => head(&conn, &cfg.loader.table, args.rows)?,
    };
    let out = serde_json::to_string_pretty(&result).context("serializing rows")?;
    println!("{}", out);
    Ok(())
}
