use super::config::Pen;
use super::error::GridError;
use super::mesh::Mesh;
use super::{F, edges};
use image::{ImageBuffer, Rgba, RgbaImage};
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Pixel-space segments of every triangle edge, in draw order.
///
/// Each triangle yields (v0,v1), (v1,v2), (v2,v0), so an edge shared by two triangles is
/// produced twice. UVs are scaled by the image size per axis without clamping.
pub fn uv_segments(mesh: &Mesh, [w, h]: [u32; 2]) -> impl Iterator<Item = [[F; 2]; 2]> + '_ {
    let to_px = move |[u, v]: [F; 2]| [u * w as F, v * h as F];
    mesh.f.iter().flat_map(move |t| {
        edges(t).map(move |[a, b]| [to_px(mesh.uv[a]), to_px(mesh.uv[b])])
    })
}

/// Draws the UV wireframe of `mesh` over a canvas filled with `background`.
///
/// Lines are not anti-aliased and anything outside the canvas is clipped. The background is
/// stored exactly, alpha included; only pixels the pen touches are blended.
pub fn draw_uv_grid(
    mesh: &Mesh,
    size: [u32; 2],
    pen: &Pen,
    background: Rgba<u8>,
) -> Result<RgbaImage, GridError> {
    let [w, h] = size;
    let canvas_err = || GridError::Canvas {
        width: w,
        height: h,
    };
    // transparent coverage layer, the pen is only applied when compositing
    let mut coverage = Pixmap::new(w, h).ok_or_else(canvas_err)?;

    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    paint.anti_alias = false;

    let stroke = Stroke {
        width: pen.width as f32,
        line_cap: LineCap::Butt,
        ..Default::default()
    };

    for [[x0, y0], [x1, y1]] in uv_segments(mesh, size) {
        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32, y0 as f32);
        pb.line_to(x1 as f32, y1 as f32);
        // degenerate or non-finite
        let Some(path) = pb.finish() else {
            continue;
        };
        coverage.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let cov = coverage.pixels();
    Ok(ImageBuffer::from_fn(w, h, |x, y| {
        match cov[(y * w + x) as usize].alpha() {
            0 => background,
            c => blend(background, pen.color, c),
        }
    }))
}

/// Straight alpha source-over of `src` onto `dst`, with `src` alpha scaled by `coverage`.
fn blend(dst: Rgba<u8>, src: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let sa = (src.0[3] as f32 / 255.) * (coverage as f32 / 255.);
    let da = dst.0[3] as f32 / 255.;
    let oa = sa + da * (1. - sa);
    if oa <= 0. {
        return dst;
    }
    let c = |i: usize| {
        let v = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1. - sa)) / oa;
        v.round().clamp(0., 255.) as u8
    };
    Rgba([c(0), c(1), c(2), (oa * 255.).round() as u8])
}

#[cfg(test)]
fn single_tri(uv: [[F; 2]; 3]) -> Mesh {
    Mesh::new(uv.to_vec(), vec![[0, 1, 2]]).unwrap()
}

#[test]
fn test_segments_unit_tri() {
    let m = single_tri([[0., 0.], [1., 0.], [0., 1.]]);
    let segs = uv_segments(&m, [100, 100]).collect::<Vec<_>>();
    assert_eq!(
        segs,
        vec![
            [[0., 0.], [100., 0.]],
            [[100., 0.], [0., 100.]],
            [[0., 100.], [0., 0.]],
        ]
    );
}

#[test]
fn test_segments_per_axis_unclamped() {
    let m = single_tri([[0.5, 0.5], [2., -1.], [0.25, 1.]]);
    let segs = uv_segments(&m, [200, 40]).collect::<Vec<_>>();
    assert_eq!(segs[0], [[100., 20.], [400., -40.]]);
    assert_eq!(segs[1][1], [50., 40.]);
}

#[test]
fn test_shared_edges_drawn_twice() {
    let m = Mesh::new(
        vec![[0., 0.], [1., 0.], [0., 1.], [1., 1.]],
        vec![[0, 1, 2], [2, 1, 3]],
    )
    .unwrap();
    let segs = uv_segments(&m, [10, 10]).collect::<Vec<_>>();
    assert_eq!(segs.len(), 6);
    assert_eq!(segs[1], [[10., 0.], [0., 10.]]);
    assert_eq!(segs[3], [[0., 10.], [10., 0.]]);
}

#[test]
fn test_draw() {
    let m = single_tri([[0.1, 0.5], [0.9, 0.5], [0.5, 0.9]]);
    let pen = Pen {
        color: Rgba([255, 0, 0, 255]),
        width: 3.,
    };
    let img = draw_uv_grid(&m, [100, 100], &pen, super::color::TRANSPARENT).unwrap();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(img.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
    assert_eq!(img.get_pixel(5, 5), &Rgba([0; 4]));
    assert_eq!(img.get_pixel(50, 70), &Rgba([0; 4]));

    let white = Rgba([255; 4]);
    let img = draw_uv_grid(&m, [100, 100], &pen, white).unwrap();
    assert_eq!(img.get_pixel(5, 5), &white);
    assert_eq!(img.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
}

#[test]
fn test_draw_out_of_range_uvs() {
    let m = single_tri([[-3., -3.], [4., 0.5], [F::NAN, 0.]]);
    let bg = Rgba([10, 20, 30, 255]);
    let img = draw_uv_grid(&m, [16, 8], &Pen::default(), bg).unwrap();
    assert_eq!(img.dimensions(), (16, 8));
    assert_eq!(img.get_pixel(15, 7), &bg);
}

#[test]
fn test_empty_mesh_is_background() {
    let bg = Rgba([0, 128, 0, 255]);
    let img = draw_uv_grid(&Mesh::default(), [4, 3], &Pen::default(), bg).unwrap();
    assert!(img.pixels().all(|p| *p == bg));
}

#[test]
fn test_canvas_too_large() {
    let bg = super::color::TRANSPARENT;
    let r = draw_uv_grid(&Mesh::default(), [u32::MAX, u32::MAX], &Pen::default(), bg);
    assert!(matches!(r, Err(GridError::Canvas { .. })));
}

#[test]
fn test_background_kept_exactly() {
    for bg in [Rgba([200, 100, 50, 3]), Rgba([255, 0, 255, 0]), Rgba([7, 8, 9, 128])] {
        let img = draw_uv_grid(&Mesh::default(), [2, 2], &Pen::default(), bg).unwrap();
        assert!(img.pixels().all(|p| *p == bg), "{bg:?}");
    }

    // untouched pixels next to a drawn edge keep the exact background too
    let m = single_tri([[0.1, 0.5], [0.9, 0.5], [0.5, 0.9]]);
    let bg = Rgba([200, 100, 50, 3]);
    let img = draw_uv_grid(&m, [100, 100], &Pen::default(), bg).unwrap();
    assert_eq!(img.get_pixel(5, 5), &bg);
}

#[test]
fn test_translucent_pen() {
    let m = single_tri([[0.1, 0.5], [0.9, 0.5], [0.5, 0.9]]);
    let pen = Pen {
        color: Rgba([0, 0, 0, 128]),
        width: 3.,
    };
    let img = draw_uv_grid(&m, [100, 100], &pen, Rgba([255; 4])).unwrap();
    assert_eq!(img.get_pixel(50, 50), &Rgba([127, 127, 127, 255]));

    let img = draw_uv_grid(&m, [100, 100], &pen, super::color::TRANSPARENT).unwrap();
    assert_eq!(img.get_pixel(50, 50), &Rgba([0, 0, 0, 128]));
}
