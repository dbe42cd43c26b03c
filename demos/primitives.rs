//! Builds the quad, cube and cone primitives and reports their geometry

use clap::Parser;
use pixmesh::prelude::*;

#[derive(Parser)]
#[command(name = "primitives", about = "Quad, cube and cone meshes")]
struct Cli {
    /// Edge length
    #[arg(short, long, default_value = "1.0")]
    size: f32,

    /// Run the mesh optimizer on each primitive
    #[arg(long)]
    optimize: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    for primitive in [Primitive::Quad, Primitive::Cube, Primitive::Cone] {
        let mut mesh = primitive.build(cli.size);
        if cli.optimize {
            mesh = optimize_mesh(&mesh)?;
        }
        let (min, max) = mesh.bounding_box();
        println!(
            "{:?}: {} triangles, {} vertices, area {:.3}, bounds ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})",
            primitive,
            mesh.triangle_count(),
            mesh.vertex_count(),
            mesh.surface_area(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
    }
    Ok(())
}
