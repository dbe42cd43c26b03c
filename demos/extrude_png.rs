//! Extrudes the opaque parts of a PNG into a mesh
//!
//! Prints pipeline statistics and optionally writes the mesh as Wavefront OBJ.
//! Set `RUST_LOG=debug` to follow the individual stages.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pixmesh::prelude::*;
use pixmesh::reconstruction::parallel::{init_thread_pool, ThreadPoolConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    Ears,
    Optimal,
    Monotone,
}

impl From<Method> for TriangulationMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Ears => TriangulationMethod::EarClipping,
            Method::Optimal => TriangulationMethod::Optimal,
            Method::Monotone => TriangulationMethod::Monotone,
        }
    }
}

#[derive(Parser)]
#[command(name = "extrude_png", about = "Transparent PNG to extruded triangle mesh")]
struct Cli {
    /// Input image path
    input: PathBuf,

    /// Write the mesh as OBJ
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Level of detail, 0 (coarsest) to 8 (finest)
    #[arg(short, long, default_value = "5")]
    quality: u8,

    #[arg(short, long, value_enum, default_value = "optimal")]
    method: Method,

    /// Alpha threshold in 0..=1
    #[arg(long, default_value = "0.875")]
    alpha: f64,

    /// Scales the extrusion depth
    #[arg(long, default_value = "1.0")]
    depth: f32,

    /// Single slice side walls
    #[arg(long)]
    solid: bool,

    /// Keep the raw triangle soup
    #[arg(long)]
    no_optimize: bool,

    /// Worker threads (rayon's choice if omitted)
    #[arg(long)]
    threads: Option<usize>,
}

fn load_bitmap(path: &Path) -> anyhow::Result<Bitmap> {
    let image = ::image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Bitmap::from_rgba(width as usize, height as usize, image.into_raw())?)
}

fn write_obj(mesh: &Mesh, path: &Path) -> anyhow::Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("failed to create {}", path.display()))?);
    writeln!(out, "# pixmesh: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;
    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v.position.x, v.position.y, v.position.z)?;
    }
    for v in &mesh.vertices {
        writeln!(out, "vt {} {}", v.uv.x, 1.0 - v.uv.y)?;
    }
    for v in &mesh.vertices {
        writeln!(out, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        let workers = init_thread_pool(&ThreadPoolConfig::default().with_threads(threads))?;
        log::info!("running with {} object workers", workers);
    }

    let config = ExtrusionConfig::for_quality(cli.quality)
        .with_alpha_tolerance(cli.alpha)
        .with_depth_multiplier(cli.depth)
        .with_wireframe(!cli.solid)
        .with_triangulation(cli.method.into())
        .with_optimize(!cli.no_optimize);

    let bitmap = load_bitmap(&cli.input)?;
    println!("Loaded {} ({}x{})", cli.input.display(), bitmap.width, bitmap.height);

    let result = ExtrusionPipeline::new(config).extrude(&bitmap)?;
    if result.outline_canceled {
        println!("Too many objects, extruded the image bounds instead");
    }
    println!("Objects:   {}", result.object_count);
    println!(
        "Triangles: {} ({} before optimization)",
        result.mesh.triangle_count(),
        result.triangle_count_before_optimization
    );
    println!("Vertices:  {}", result.mesh.vertex_count());

    let stats = MeshStatistics::analyze(&result.mesh);
    println!("ACMR:      {:.3}  ATVR: {:.3}", stats.acmr, stats.atvr);
    println!("Time:      {:.1} ms", result.processing_time * 1000.0);

    if let Some(output) = &cli.output {
        write_obj(&result.mesh, output)?;
        println!("Wrote {}", output.display());
    }
    Ok(())
}
