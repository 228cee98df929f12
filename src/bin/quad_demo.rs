//! Builds the procedural quad in one or all layouts and reports the buffers.
//!
//! ```bash
//! # Build every layout
//! quad_demo
//!
//! # Build the multi-stream quad and print every vertex
//! RUST_LOG=debug quad_demo --layout multi-stream --dump
//! ```

use clap::Parser;

use procedural_mesh::{HeadlessHost, Mesh, MeshLayout, MeshResult, ProceduralQuad};

/// Layout selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliLayout {
    /// Per-attribute arrays set through the mesh API.
    Separate,
    /// One stream of packed vertex records.
    Interleaved,
    /// One stream per attribute.
    MultiStream,
    /// Build every layout in turn.
    #[default]
    All,
}

impl CliLayout {
    fn layouts(self) -> Vec<MeshLayout> {
        match self {
            CliLayout::Separate => vec![MeshLayout::SeparateArrays],
            CliLayout::Interleaved => vec![MeshLayout::Interleaved],
            CliLayout::MultiStream => vec![MeshLayout::MultiStream],
            CliLayout::All => MeshLayout::ALL.to_vec(),
        }
    }
}

/// Procedural quad mesh demo.
#[derive(Parser, Debug)]
#[command(name = "quad_demo", about = "Build a procedural quad mesh", version)]
struct Args {
    /// Vertex layout to build.
    #[arg(long, default_value = "all", value_enum)]
    layout: CliLayout,

    /// Print every decoded vertex and triangle.
    #[arg(long)]
    dump: bool,
}

fn report(layout: MeshLayout, mesh: &Mesh, dump: bool) {
    println!(
        "{:?}: {} vertices, {} indices ({:?}), bounds center {} size {}",
        layout,
        mesh.vertex_count(),
        mesh.index_count(),
        mesh.index_format(),
        mesh.bounds().center,
        mesh.bounds().size()
    );
    let vertex_layout = mesh.layout();
    for stream in 0..mesh.buffer_count() {
        let semantics: Vec<_> = vertex_layout
            .attributes_for_buffer(stream as u32)
            .map(|a| a.semantic)
            .collect();
        println!(
            "  stream {}: stride {} {:?}",
            stream,
            vertex_layout.buffer_stride(stream),
            semantics
        );
    }
    if !dump {
        return;
    }
    let vertices = mesh
        .positions()
        .into_iter()
        .zip(mesh.normals())
        .zip(mesh.tangents())
        .zip(mesh.uvs(0));
    for (i, (((position, normal), tangent), uv)) in vertices.enumerate() {
        println!(
            "  v{}: position {} normal {} tangent {} uv {}",
            i, position, normal, tangent, uv
        );
    }
    for triangle in mesh.triangles() {
        println!("  triangle {:?}", triangle);
    }
}

fn run(args: &Args) -> MeshResult<()> {
    let mut host = HeadlessHost::new();
    for layout in args.layout.layouts() {
        let mut component = ProceduralQuad::new(layout);
        let handle = component.on_enable(&mut host)?;
        if let Some(mesh) = host.mesh(handle) {
            report(layout, mesh, args.dump);
        }
    }
    log::info!("Built {} mesh(es)", host.len());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting procedural quad demo");
    procedural_mesh::init();

    if let Err(err) = run(&args) {
        log::error!("Failed to build quad: {}", err);
        std::process::exit(1);
    }
}
