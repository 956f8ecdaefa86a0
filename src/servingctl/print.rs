use chrono::{DateTime, Utc};
use colored::Colorize;
use servingctl::codec;
use servingctl::commands::{CmdMessage, MessageLevel};
use servingctl::config::{OutputFormat, ServingConfig, CONFIG_KEYS};
use servingctl::error::Result;
use servingctl::model::{Kind, Resource, ResourceList};
use timeago::Formatter;
use unicode_width::UnicodeWidthStr;

const NONE: &str = "-";
const COLUMN_GAP: usize = 3;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn print_list(kind: Kind, list: &ResourceList, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", codec::list_to_yaml(list)?),
        OutputFormat::Json => println!("{}", codec::list_to_json(list)?),
        OutputFormat::Table if list.is_empty() => println!("No {}s found.", kind),
        OutputFormat::Table => {
            let rows: Vec<[String; 4]> = list
                .items
                .iter()
                .map(|r| {
                    [
                        r.name().to_string(),
                        r.namespace().to_string(),
                        r.image().unwrap_or(NONE).to_string(),
                        format_age(r.metadata.creation_timestamp),
                    ]
                })
                .collect();
            print_table(["NAME", "NAMESPACE", "IMAGE", "AGE"], &rows);
        }
    }
    Ok(())
}

pub fn print_resources(resources: &[Resource], format: OutputFormat) -> Result<()> {
    for (i, resource) in resources.iter().enumerate() {
        match format {
            OutputFormat::Yaml => {
                if i > 0 {
                    println!("---");
                }
                print!("{}", codec::to_yaml(resource)?);
            }
            OutputFormat::Json => println!("{}", codec::to_json(resource)?),
            OutputFormat::Table => {
                if i > 0 {
                    println!();
                }
                print_summary(resource);
            }
        }
    }
    Ok(())
}

pub fn print_config(config: &ServingConfig) -> Result<()> {
    for key in CONFIG_KEYS {
        let value = config.get(key)?;
        let value = if value.is_empty() { NONE.to_string() } else { value };
        println!("{} = {}", key, value);
    }
    Ok(())
}

fn print_summary(resource: &Resource) {
    let meta = &resource.metadata;
    let field = |label: &str, value: &str| {
        println!("{}{}", format!("{:<12}", format!("{}:", label)).bold(), value)
    };

    field("Name", meta.name.as_str());
    field("Namespace", meta.namespace.as_str());
    field("Kind", resource.kind.as_str());
    if let Some(image) = resource.image() {
        field("Image", image);
    }
    if !meta.labels.is_empty() {
        let labels: Vec<_> = meta.labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        field("Labels", labels.join(", ").as_str());
    }
    field("Age", format_age(meta.creation_timestamp).as_str());
}

fn print_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) {
    let mut widths = headers.map(|h| h.width());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let header_line = pad_cells(headers.iter().copied(), &widths);
    println!("{}", header_line.bold());
    for row in rows {
        println!("{}", pad_cells(row.iter().map(String::as_str), &widths));
    }
}

fn pad_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<_> = cells.collect();
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if i < last {
            let padding = width.saturating_sub(cell.width()) + COLUMN_GAP;
            line.push_str(&" ".repeat(padding));
        }
    }
    line
}

fn format_age(created: Option<DateTime<Utc>>) -> String {
    let Some(created) = created else {
        return NONE.to_string();
    };
    let elapsed = Utc::now().signed_duration_since(created);

    let formatter = Formatter::new();
    let ago = formatter.convert(elapsed.to_std().unwrap_or_default());
    ago.trim_end_matches(" ago").to_string()
}
