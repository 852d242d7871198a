//! # CLI Commands
//!
//! Each command is a plain function returning a serializable report, so
//! the binary only decides how to print it and tests can call it directly.

use clap::ValueEnum;
use netpixi_core::{
    DenseGraph, GraphShape, KeyedGraph, NetpixiError, SaveOptions, VertexId, load_dense,
    load_keyed, metrics, save_dense, save_keyed,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] NetpixiError),

    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Vertex {0} has no integer or string id")]
    MissingId(usize),
}

pub type CliResult<T> = Result<T, CliError>;

// =============================================================================
// OPTIONS
// =============================================================================

/// Which in-memory model a command loads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Dense,
    Keyed,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Model::Dense => "dense",
            Model::Keyed => "keyed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Degree,
    InDegree,
    OutDegree,
    EffectiveSize,
    Constraint,
}

impl Metric {
    fn compute(self, graph: &DenseGraph) -> Vec<f64> {
        match self {
            Metric::Degree => metrics::total_degree(graph),
            Metric::InDegree => metrics::in_degree(graph),
            Metric::OutDegree => metrics::out_degree(graph),
            Metric::EffectiveSize => metrics::effective_size(graph),
            Metric::Constraint => metrics::constraint(graph),
        }
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Shape of a loaded or written graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub path: String,
    pub model: Model,
    pub directed: bool,
    pub vertices: usize,
    pub edges: usize,
}

impl GraphSummary {
    fn of(path: &Path, model: Model, graph: &impl GraphShape) -> Self {
        Self {
            path: path.display().to_string(),
            model,
            directed: graph.is_directed(),
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        }
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.directed { "directed" } else { "undirected" };
        write!(
            f,
            "{}: {} graph, {} vertices, {} edges ({} model)",
            self.path, kind, self.vertices, self.edges, self.model
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub id: VertexId,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub metric: Metric,
    pub values: Vec<MetricValue>,
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.values.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}\t{:.6}", entry.id, entry.value)?;
        }
        Ok(())
    }
}

/// Render a report as text, or as pretty JSON when `json` is set.
pub fn render<T: Serialize + fmt::Display>(report: &T, json: bool) -> CliResult<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.to_string())
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Load a file and summarize it.
pub fn cmd_check(path: &Path, model: Model) -> CliResult<GraphSummary> {
    let summary = match model {
        Model::Dense => GraphSummary::of(path, model, &load_dense(path)?),
        Model::Keyed => GraphSummary::of(path, model, &load_keyed(path)?),
    };
    info!(path = %path.display(), vertices = summary.vertices, edges = summary.edges, "checked");
    Ok(summary)
}

/// Load `input` and save it again to `output`.
pub fn cmd_convert(input: &Path, output: &Path, model: Model, level: u32) -> CliResult<GraphSummary> {
    let options = SaveOptions::new().with_compression(level);
    let summary = match model {
        Model::Dense => {
            let graph: DenseGraph = load_dense(input)?;
            save_dense(&graph, output, &options)?;
            GraphSummary::of(output, model, &graph)
        }
        Model::Keyed => {
            let graph: KeyedGraph = load_keyed(input)?;
            save_keyed(&graph, output, &options)?;
            GraphSummary::of(output, model, &graph)
        }
    };
    info!(input = %input.display(), output = %output.display(), level = options.level(), "converted");
    Ok(summary)
}

/// Compute a per-vertex metric, keyed by vertex id.
pub fn cmd_metrics(path: &Path, metric: Metric) -> CliResult<MetricReport> {
    let graph = load_dense(path)?;
    let values = metric.compute(&graph);
    debug!(metric = ?metric, vertices = values.len(), "computed metric");

    let values = graph
        .vertices()
        .zip(values)
        .map(|(v, value)| {
            let id = graph
                .vertex_id(v)
                .as_ref()
                .and_then(VertexId::from_value)
                .ok_or(CliError::MissingId(v))?;
            Ok(MetricValue { id, value })
        })
        .collect::<CliResult<Vec<_>>>()?;
    Ok(MetricReport { metric, values })
}

/// Save the largest weakly connected component of `input` to `output`.
pub fn cmd_component(input: &Path, output: &Path, level: u32) -> CliResult<GraphSummary> {
    let graph = load_dense(input)?;
    let component = metrics::largest_component(&graph).map_err(NetpixiError::from)?;
    save_dense(&component, output, &SaveOptions::new().with_compression(level))?;
    info!(
        kept = component.vertex_count(),
        total = graph.vertex_count(),
        "saved largest component"
    );
    Ok(GraphSummary::of(output, Model::Dense, &component))
}
