use crate::config::RenderConfig;
use crate::mesh::Mesh;
use crate::raster::uv_segments;
use image::Rgba;
use svg::{
    Document,
    node::element::{Line, Rectangle},
};

/// Appended to an input path to name its SVG output.
pub const OUTPUT_SUFFIX: &str = ".grid.svg";

fn rgb(Rgba([r, g, b, _]): Rgba<u8>) -> String {
    format!("rgb({r},{g},{b})")
}

fn opacity(Rgba([.., a]): Rgba<u8>) -> f32 {
    a as f32 / 255.
}

/// Save the same wireframe as [`crate::raster::draw_uv_grid`] as an SVG in pixel units.
pub fn save_uv_grid(
    dst: impl AsRef<std::path::Path>,
    mesh: &Mesh,
    cfg: &RenderConfig,
) -> std::io::Result<()> {
    let [w, h] = cfg.size;
    let mut doc = Document::new()
        .set("viewBox", (0, 0, w, h))
        .set("width", w)
        .set("height", h);

    if cfg.background.0[3] > 0 {
        let bg = Rectangle::new()
            .set("width", w)
            .set("height", h)
            .set("fill", rgb(cfg.background))
            .set("fill-opacity", opacity(cfg.background));
        doc = doc.add(bg);
    }

    for [[x0, y0], [x1, y1]] in uv_segments(mesh, cfg.size) {
        let line = Line::new()
            .set("x1", x0)
            .set("y1", y0)
            .set("x2", x1)
            .set("y2", y1)
            .set("stroke", rgb(cfg.pen.color))
            .set("stroke-opacity", opacity(cfg.pen.color))
            .set("stroke-width", cfg.pen.width);
        doc = doc.add(line);
    }

    svg::save(dst, &doc)
}

#[test]
fn test_save_uv_grid() {
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("tri.msh.grid.svg");
    let m = Mesh::new(vec![[0., 0.], [1., 0.], [0., 1.]], vec![[0, 1, 2]]).unwrap();
    let cfg = RenderConfig {
        size: [100, 50],
        ..RenderConfig::default()
    };
    save_uv_grid(&dst, &m, &cfg).unwrap();
    let s = std::fs::read_to_string(&dst).unwrap();
    assert_eq!(s.matches("<line").count(), 3);
    assert!(!s.contains("<rect"));
    assert!(s.contains("viewBox=\"0 0 100 50\""));
}
