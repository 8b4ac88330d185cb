//! Output renderers and formatting helpers for CLI commands.

use std::io::Write;

use anyhow::anyhow;
use cloudctl_api_models::{
    Collection, DatacenterProperties, K8sClusterProperties, NatGatewayProperties,
    NodePoolProperties, Request, Resource,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Row view of a resource for table output.
pub(crate) trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for Resource<DatacenterProperties> {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "LOCATION", "STATE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            text(self.properties.name.as_deref()),
            text(self.properties.location.as_deref()),
            self.state().to_string(),
        ]
    }
}

impl TableRow for Resource<K8sClusterProperties> {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "VERSION", "STATE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            text(self.properties.name.as_deref()),
            text(self.properties.k8s_version.as_deref()),
            self.state().to_string(),
        ]
    }
}

impl TableRow for Resource<NodePoolProperties> {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "NODES", "DATACENTER", "STATE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            text(self.properties.name.as_deref()),
            self.properties
                .node_count
                .map_or_else(|| "-".to_string(), |count| count.to_string()),
            text(self.properties.datacenter_id.as_deref()),
            self.state().to_string(),
        ]
    }
}

impl TableRow for Resource<NatGatewayProperties> {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "PUBLIC IPS", "STATE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            text(self.properties.name.as_deref()),
            if self.properties.public_ips.is_empty() {
                "-".to_string()
            } else {
                self.properties.public_ips.join(",")
            },
            self.state().to_string(),
        ]
    }
}

impl TableRow for Request {
    const HEADERS: &'static [&'static str] = &["ID", "METHOD", "URL", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.properties.method.clone(),
            self.properties.url.clone(),
            text(self.status()),
        ]
    }
}

pub(crate) fn render_list<T>(
    out: &mut (dyn Write + Send),
    collection: &Collection<T>,
    format: OutputFormat,
) -> CliResult<()>
where
    T: TableRow + Serialize,
{
    match format {
        OutputFormat::Json => write_json(out, &collection.items),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = collection.items.iter().map(TableRow::cells).collect();
            write_table(out, T::HEADERS, &rows)
        }
    }
}

pub(crate) fn render_one<T>(
    out: &mut (dyn Write + Send),
    item: &T,
    format: OutputFormat,
) -> CliResult<()>
where
    T: TableRow + Serialize,
{
    match format {
        OutputFormat::Json => write_json(out, item),
        OutputFormat::Table => write_table(out, T::HEADERS, &[item.cells()]),
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut (dyn Write + Send), value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    writeln!(out, "{text}")?;
    Ok(())
}

fn write_table(
    out: &mut (dyn Write + Send),
    headers: &[&str],
    rows: &[Vec<String>],
) -> CliResult<()> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|header| (*header).to_string()).collect();
    writeln!(out, "{}", format_row(&header_cells, &widths))?;
    for row in rows {
        writeln!(out, "{}", format_row(row, &widths))?;
    }
    Ok(())
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
