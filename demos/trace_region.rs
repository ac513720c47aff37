//! Marks a loop on a dome-shaped grid and cuts out the enclosed patch.
//!
//! Run with `RUST_LOG=surfmark=debug` to follow each extraction stage.

use std::error::Error;
use std::rc::Rc;

use surfmark::editor::{CurveEditor, EditorParams, NullHandles};
use surfmark::math::Point3;
use surfmark::surface::TriangleSurface;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let flat = TriangleSurface::grid(41, 41, 0.5)?;
    let dome: Vec<Point3> = flat
        .vertices()
        .iter()
        .map(|v| {
            let r2 = (v.x - 10.0).powi(2) + (v.y - 10.0).powi(2);
            Point3::new(v.x, v.y, 4.0 * (-r2 / 40.0).exp())
        })
        .collect();
    let surface = Rc::new(flat.deformed(dome)?);

    let mut editor = CurveEditor::new(EditorParams::default(), Box::new(NullHandles::default()));
    editor.start(surface)?;
    for (x, y) in [(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)] {
        editor.add_anchor_at(&Point3::new(x, y, 0.0));
    }
    editor.close_loop();
    editor.stop()?;

    let region = editor.extract_region()?;
    tracing::info!(
        vertices = region.patch.vertex_count(),
        faces = region.patch.faces.len(),
        barrier = region.barrier.len(),
        unresolved_gaps = region.unresolved_gaps,
        components = region.component_count,
        "region extracted"
    );
    Ok(())
}
