use crate::{client::ApiInfo, constants::DEFAULT_API_LIST_LIMIT};
use anyhow::Result;
use clap::{Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// List APIs of an environment
    Apis {
        #[arg(short, long)]
        environment: String,
        /// Search query, e.g. `name:Pizza` or `provider:admin`
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long, default_value_t = DEFAULT_API_LIST_LIMIT)]
        limit: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

pub async fn run(cmd: GetCommands, insecure: bool) -> Result<()> {
    match cmd {
        GetCommands::Apis {
            environment,
            query,
            limit,
            format,
        } => {
            let client = super::connect(&environment, insecure).await?;
            let apis = client.list_apis(query.as_deref(), limit).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&apis.list)?),
                OutputFormat::Table => print!("{}", render_api_table(&apis.list)),
            }
        }
    }
    Ok(())
}

const API_HEADERS: [&str; 6] = ["ID", "NAME", "VERSION", "CONTEXT", "STATUS", "PROVIDER"];

/// Render APIs as left-aligned columns separated by three spaces
pub fn render_api_table(apis: &[ApiInfo]) -> String {
    let rows: Vec<[&str; 6]> = apis
        .iter()
        .map(|a| {
            [
                a.id.as_str(),
                a.name.as_str(),
                a.version.as_str(),
                a.context.as_str(),
                a.life_cycle_status.as_str(),
                a.provider.as_str(),
            ]
        })
        .collect();

    let mut widths = API_HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&API_HEADERS).chain(rows.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(line.join("   ").trim_end());
        out.push('\n');
    }
    out
}
