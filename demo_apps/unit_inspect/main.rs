//! Unit Inspector
//!
//! Loads a unit descriptor (or a single `.msh` file) from a data root and
//! prints the assembled skeleton, meshes, clips and every diagnostic.
//!
//! ```text
//! unit_inspect Data Units/SpaceMarine.xml
//! unit_inspect Data --mesh Video/Meshes/Units/SpaceMarine.msh --no-weld
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use gladius::assets::sink::MeshOutput;
use gladius::{
    CollectingSink, ImportSettings, LoadReport, MaterialDescriptor, Skeleton, UnitAsset, UnitLoader,
};

#[derive(Parser, Debug)]
#[command(name = "unit_inspect")]
#[command(about = "Inspect Gladius unit meshes, skeletons and animations")]
struct Cli {
    /// Data root containing `Video/` and the unit descriptors
    root: PathBuf,

    /// Unit descriptor, relative to the data root
    descriptor: Option<PathBuf>,

    /// Import a single mesh file instead of a unit
    #[arg(long, conflicts_with = "descriptor")]
    mesh: Option<PathBuf>,

    /// JSON import settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Keep the exploded triangle soup
    #[arg(long)]
    no_weld: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => ImportSettings::from_json_file(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?,
        None => ImportSettings::default(),
    };
    if cli.no_weld {
        settings = settings.without_welding();
    }
    let loader = UnitLoader::from_data_root(&cli.root, settings);

    let report = match (&cli.descriptor, &cli.mesh) {
        (_, Some(mesh)) => load_mesh(&loader, mesh),
        (Some(descriptor), None) => loader.load_unit_asset(descriptor),
        (None, None) => bail!("Either a unit descriptor or --mesh is required"),
    };

    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }
    let asset = report.result.context("Import failed")?;
    print_asset(&asset);
    Ok(())
}

fn load_mesh(
    loader: &UnitLoader<gladius::FileAssetReader>,
    path: &Path,
) -> LoadReport<UnitAsset> {
    let mut sink = CollectingSink::new();
    let scale = loader.settings().scale;
    loader
        .load_mesh_file(path, &mut sink)
        .map(|skeleton| sink.into_asset(skeleton, scale))
}

fn print_asset(asset: &UnitAsset) {
    println!("Skeleton: {} bones", asset.skeleton.len());
    for (index, _) in asset.skeleton.roots() {
        print_bone(&asset.skeleton, index, 1);
    }

    println!("Meshes: {}", asset.meshes.len());
    for mesh in &asset.meshes {
        print_mesh(&asset.skeleton, mesh);
    }

    println!("Clips: {}", asset.clips.len());
    for clip in &asset.clips {
        println!(
            "  {}: frames {}..={} at {} fps, {} tracks ({})",
            clip.name,
            clip.frame_range.0,
            clip.frame_range.1,
            clip.tracks.frame_rate,
            clip.tracks.tracks.len(),
            clip.source.display()
        );
    }
}

fn print_bone(skeleton: &Skeleton, index: usize, depth: usize) {
    let Some(bone) = skeleton.get(index) else {
        return;
    };
    println!("{:indent$}{}", "", bone.name, indent = depth * 2);
    for (child, _) in skeleton.children(index) {
        print_bone(skeleton, child, depth + 1);
    }
}

fn print_mesh(skeleton: &Skeleton, output: &MeshOutput<MaterialDescriptor>) {
    let mesh = &output.mesh;
    let parent = output
        .parent_bone
        .and_then(|i| skeleton.get(i))
        .map_or("-", |b| b.name.as_str());
    println!(
        "  {}: {} vertices, {} triangles (from {} / {}), parent {parent}",
        mesh.name,
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.stats.input_vertices,
        mesh.stats.input_triangles,
    );
    if let Some(material) = &output.material {
        println!(
            "    material {}: diffuse {:?}, normal {:?}, surface {:?}",
            material.name, material.diffuse, material.normal, material.surface_info
        );
    }
    if let Some(bbox) = &output.attachment_box {
        println!("    attachment box {}", bbox.name);
    }
}
