//! CLI command implementations

use anyhow::Context;
use mindmap_core::{EditorConfig, GraphStore, load_diagram, save_diagram, summarize};
use mindmap_server::{MindmapServer, ServerConfig};
use std::path::PathBuf;

pub async fn serve(
    config: EditorConfig,
    host: String,
    port: u16,
    open: bool,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    tracing::info!("Starting mindmap server on {}:{}", host, port);

    let store = match file {
        Some(path) => {
            let diagram = load_diagram(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!(
                "Loaded {}: {} nodes, {} edges",
                path.display(),
                diagram.nodes.len(),
                diagram.edges.len()
            );
            GraphStore::with_diagram(config, diagram)
        }
        None => GraphStore::new(config),
    };

    let server = MindmapServer::new(store, ServerConfig { host, port });

    if open {
        let url = format!("http://{}", server.config().address());
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser at {}: {}", url, e);
        }
    }

    server.start().await
}

pub fn new_document(config: EditorConfig, output: PathBuf, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let store = GraphStore::new(config);
    save_diagram(&store.export_diagram(), &output)?;

    tracing::info!("Wrote {}", output.display());
    Ok(())
}

pub fn inspect(file: PathBuf) -> anyhow::Result<()> {
    let diagram =
        load_diagram(&file).with_context(|| format!("Failed to load {}", file.display()))?;
    let summary = summarize(&diagram);

    println!("{}", file.display());
    println!("  nodes:            {}", summary.node_count);
    println!("  edges:            {}", summary.edge_count);
    println!("  components:       {}", summary.components);
    println!(
        "  roots:            {}",
        summary
            .roots
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  self loops:       {}", summary.self_loops);
    println!("  parallel edges:   {}", summary.parallel_edges);
    println!("  cycles:           {}", if summary.has_cycle { "yes" } else { "no" });

    if !summary.is_consistent() {
        println!("  dangling edges:   {}", summary.dangling_edges.len());
        println!("  duplicate nodes:  {}", summary.duplicate_node_ids.len());
        println!("  duplicate edges:  {}", summary.duplicate_edge_ids.len());
        tracing::warn!("{} breaks diagram invariants", file.display());
    }
    Ok(())
}
