use std::fs;
use std::path::Path;
use uvgrid::batch::{output_path, run};
use uvgrid::image::{self, GenericImageView};
use uvgrid::msh::{self, Msh};
use uvgrid::{FileState, Mesh, MshError, Pen, RenderConfig};

fn write_msh(p: &Path, m: &Mesh) {
    let mut buf = vec![];
    msh::write(m, &mut buf).unwrap();
    fs::write(p, buf).unwrap();
}

fn quad() -> Mesh {
    Mesh::new(
        vec![[0., 0.], [1., 0.], [0., 1.], [1., 1.]],
        vec![[0, 1, 2], [2, 1, 3]],
    )
    .unwrap()
}

#[test]
fn test_failure_is_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let good0 = tmp.path().join("0.msh");
    let bad = tmp.path().join("1.msh");
    let good2 = tmp.path().join("2.msh");
    write_msh(&good0, &quad());
    fs::write(&bad, b"definitely not a mesh").unwrap();
    write_msh(&good2, &quad());

    let cfg = RenderConfig {
        paths: vec![good0.clone(), bad.clone(), good2.clone()],
        size: [64, 32],
        pen: Pen {
            color: image::Rgba([0, 0, 255, 255]),
            width: 2.,
        },
        ..RenderConfig::default()
    };

    let mut out = vec![];
    let outcomes = run(&cfg, &Msh, &mut out, false).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_saved());
    assert!(matches!(
        outcomes[1].state,
        FileState::Failed(uvgrid::GridError::Parse(MshError::BadMagic))
    ));
    assert!(outcomes[2].is_saved());

    assert!(!output_path(&bad).exists());
    for p in [&good0, &good2] {
        let img = image::open(output_path(p)).unwrap();
        assert_eq!(img.dimensions(), (64, 32));
        assert_eq!(img.color(), image::ColorType::Rgba8);
        // interior of the lower-right triangle stays transparent
        assert_eq!(img.get_pixel(50, 28).0, [0; 4]);
    }

    let out = String::from_utf8(out).unwrap();
    let lines = out.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            good0.to_str().unwrap(),
            bad.to_str().unwrap(),
            "Not an MSH file (bad magic)",
            good2.to_str().unwrap(),
        ]
    );
}

#[test]
fn test_rerun_overwrites_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("q.msh");
    write_msh(&p, &quad());
    let cfg = RenderConfig {
        paths: vec![p.clone()],
        background: image::Rgba([255, 255, 255, 255]),
        ..RenderConfig::default()
    };

    run(&cfg, &Msh, &mut std::io::sink(), false).unwrap();
    let first = fs::read(output_path(&p)).unwrap();
    run(&cfg, &Msh, &mut std::io::sink(), false).unwrap();
    assert_eq!(fs::read(output_path(&p)).unwrap(), first);
}

#[test]
fn test_missing_file_and_custom_parser() {
    let tmp = tempfile::tempdir().unwrap();
    let present = tmp.path().join("present.msh");
    fs::write(&present, b"whatever").unwrap();
    let cfg = RenderConfig {
        paths: vec![tmp.path().join("gone.msh"), present.clone()],
        ..RenderConfig::default()
    };

    let always_empty = |_: &[u8]| -> Result<Mesh, MshError> { Ok(Mesh::default()) };
    let mut out = vec![];
    let outcomes = run(&cfg, &always_empty, &mut out, true).unwrap();
    assert!(matches!(
        outcomes[0].state,
        FileState::Failed(uvgrid::GridError::Io(_))
    ));
    assert!(outcomes[1].is_saved());

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 3);
    assert!(out.lines().nth(1).unwrap().starts_with("\x1b[31m"));

    let img = image::open(output_path(&present)).unwrap();
    assert_eq!(img.dimensions(), (512, 512));
}

#[test]
fn test_no_args_does_nothing() {
    let mut diag = vec![];
    let cfg = RenderConfig::from_args::<&str>(&[], &mut diag).unwrap();
    let mut out = vec![];
    let outcomes = run(&cfg, &Msh, &mut out, false).unwrap();
    assert!(outcomes.is_empty());
    assert!(diag.is_empty() && out.is_empty());
}

#[test]
fn test_save_failure_is_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let blocked = tmp.path().join("blocked.msh");
    let next = tmp.path().join("next.msh");
    write_msh(&blocked, &quad());
    write_msh(&next, &quad());
    // a directory where the image would go makes the save fail
    fs::create_dir(output_path(&blocked)).unwrap();

    let cfg = RenderConfig {
        paths: vec![blocked.clone(), next.clone()],
        size: [8, 8],
        ..RenderConfig::default()
    };
    let mut out = vec![];
    let outcomes = run(&cfg, &Msh, &mut out, false).unwrap();
    assert!(matches!(
        outcomes[0].state,
        FileState::Failed(uvgrid::GridError::Image(_))
    ));
    assert!(outcomes[1].is_saved());
    assert!(output_path(&blocked).is_dir());
    assert!(output_path(&next).is_file());
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
}
