use std::fs;
use std::path::{Path, PathBuf};
use uvgrid::util::discover;
use uvgrid::RenderConfig;

fn touch(p: &Path) {
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(p, b"").unwrap();
}

fn s(p: &Path) -> String {
    p.to_str().unwrap().to_string()
}

#[test]
fn test_direct_files_before_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("meshes");
    for f in ["a.msh", "B.MSH", "c.txt", "sub/d.msh", "sub/deeper/e.Msh", "sub/f.png"] {
        touch(&root.join(f));
    }
    let direct = tmp.path().join("loose.obj");
    touch(&direct);

    let args = [s(&root), "300".into(), s(&direct), "no/such/path".into()];
    let paths = discover(&args);
    let expected: Vec<PathBuf> = vec![
        direct.clone(),
        root.join("B.MSH"),
        root.join("a.msh"),
        root.join("sub/d.msh"),
        root.join("sub/deeper/e.Msh"),
    ];
    assert_eq!(paths, expected);
}

#[test]
fn test_no_dedup() {
    let tmp = tempfile::tempdir().unwrap();
    let m = tmp.path().join("m.msh");
    touch(&m);

    let args = [s(&m), s(tmp.path()), s(&m)];
    assert_eq!(discover(&args), vec![m.clone(), m.clone(), m.clone()]);
}

#[test]
fn test_config_paths_and_settings() {
    let tmp = tempfile::tempdir().unwrap();
    let m = tmp.path().join("m.msh");
    touch(&m);

    let args = [
        "color:navy".to_string(),
        s(tmp.path()),
        "640".into(),
        "penwidth:2".into(),
        "480".into(),
        "backgound:white".into(),
    ];
    let mut diag = vec![];
    let cfg = RenderConfig::from_args(&args, &mut diag).unwrap();
    assert!(diag.is_empty());
    assert_eq!(cfg.paths, vec![m]);
    assert_eq!(cfg.size, [640, 480]);
    assert_eq!(cfg.pen.width, 2.);
    assert_eq!(cfg.pen.color.0, [0, 0, 128, 255]);
    assert_eq!(cfg.background.0, [255; 4]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_args() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let tmp = tempfile::tempdir().unwrap();
    let name = OsString::from_vec(b"\xff\xfe.msh".to_vec());
    let odd = tmp.path().join(&name);
    touch(&odd);

    let args = vec![
        odd.clone().into_os_string(),
        OsString::from_vec(b"color:\xff".to_vec()),
        "32".into(),
        "16".into(),
        tmp.path().as_os_str().to_owned(),
    ];
    let mut diag = vec![];
    let cfg = RenderConfig::from_args(&args, &mut diag).unwrap();
    assert_eq!(cfg.paths, vec![odd.clone(), odd]);
    assert_eq!(cfg.size, [32, 16]);
    assert_eq!(String::from_utf8_lossy(&diag).lines().count(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_walked_once() {
    let tmp = tempfile::tempdir().unwrap();
    let a = tmp.path().join("a.msh");
    touch(&a);
    std::os::unix::fs::symlink(".", tmp.path().join("loop")).unwrap();

    assert_eq!(discover(&[s(tmp.path())]), vec![a]);
}
