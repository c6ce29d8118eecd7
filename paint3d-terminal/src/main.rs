//! paint3d Terminal Demo
//!
//! Renders a scene of meshes into the terminal with the software pipeline.
//! Controls:
//!   - Click: select a mesh, drag a gizmo arrow to move the selection
//!   - WASD / E/R: rotate the selected mesh
//!   - IJKL / U/O: move the selected mesh
//!   - Arrow keys: orbit the camera, Z: zoom
//!   - Q/ESC: Quit

use anyhow::Context;
use clap::Parser;
use paint3d_core::{stl, Mesh, Scene, Vec3};
use paint3d_terminal::{TerminalApp, ViewSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "paint3d-terminal", about = "Software 3D renderer in the terminal")]
struct Cli {
    /// STL file to load instead of the default cube and pyramid
    #[arg(long)]
    stl: Option<PathBuf>,

    /// Camera focal length in cell widths
    #[arg(long)]
    focal: Option<f32>,

    /// Near clipping distance
    #[arg(long, default_value_t = 0.1)]
    near: f32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn load_scene(cli: &Cli) -> anyhow::Result<Scene> {
    let mut scene = Scene::new();

    match &cli.stl {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "stl".to_string());
            let mesh =
                stl::parse_stl(&name, &data).with_context(|| format!("failed to parse {}", path.display()))?;
            scene.add_mesh(mesh);
        }
        None => {
            let mut cube = Mesh::cube(2.0);
            cube.transform.position = Vec3::new(-2.0, 0.0, 0.0);
            cube.transform.rotate(30.0, 45.0, 0.0);
            let mut pyramid = Mesh::pyramid(2.0);
            pyramid.transform.position = Vec3::new(2.0, 0.0, 0.0);
            scene.add_mesh(cube);
            scene.add_mesh(pyramid);
        }
    }

    scene.select(Some(0))?;
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scene = load_scene(&cli)?;
    let settings = ViewSettings {
        focal_length: cli.focal,
        near: cli.near,
    };

    let mut app = TerminalApp::new(scene, settings, cli.fps).context("failed to set up terminal")?;
    app.run()?;

    Ok(())
}
