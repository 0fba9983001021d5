use super::F;
use super::color::{self, BLACK, TRANSPARENT};
use super::util::discover;
use image::Rgba;
use log::debug;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::PathBuf;

/// Output size used unless two positive integers are given.
pub const DEFAULT_SIZE: [u32; 2] = [512, 512];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Rgba<u8>,
    pub width: F,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: BLACK,
            width: 1.,
        }
    }
}

/// Everything needed to render a batch of meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub paths: Vec<PathBuf>,
    /// Width and height in pixels, both > 0.
    pub size: [u32; 2],
    pub pen: Pen,
    pub background: Rgba<u8>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paths: vec![],
            size: DEFAULT_SIZE,
            pen: Pen::default(),
            background: TRANSPARENT,
        }
    }
}

/// Settings given as `prefix:value` tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    PenColor,
    Background,
    PenWidth,
}

impl Setting {
    /// Lowercase token prefix. The background spelling is intentionally `backgound:`,
    /// existing command lines depend on it.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::PenColor => "color:",
            Self::Background => "backgound:",
            Self::PenWidth => "penwidth:",
        }
    }
    const fn name(self) -> &'static str {
        match self {
            Self::PenColor => "pen color",
            Self::Background => "background color",
            Self::PenWidth => "pen width",
        }
    }
}

impl RenderConfig {
    /// Resolves a configuration from unordered command line tokens.
    ///
    /// Never fails on bad input: each unparseable setting token writes one line to `diag`
    /// and the next token of that kind is tried, falling back to the default.
    /// The only error is failing to write to `diag`. Tokens need not be UTF-8, they are still
    /// usable as paths.
    pub fn from_args<S: AsRef<OsStr>>(args: &[S], diag: &mut impl Write) -> io::Result<Self> {
        let mut cfg = Self {
            paths: discover(args),
            size: parse_size(args),
            ..Self::default()
        };
        if let Some(c) = first_parsed(args, Setting::PenColor, color::resolve, diag)? {
            cfg.pen.color = c;
        }
        if let Some(c) = first_parsed(args, Setting::Background, color::resolve, diag)? {
            cfg.background = c;
        }
        if let Some(w) = first_parsed(args, Setting::PenWidth, parse_width, diag)? {
            cfg.pen.width = w;
        }
        debug!("Resolved {cfg:?}");
        Ok(cfg)
    }
}

/// The first two positive integers anywhere in `args`, or [`DEFAULT_SIZE`].
/// Any other positive integer token, whatever it was meant for, counts.
/// Surrounding whitespace is ignored.
pub fn parse_size<S: AsRef<OsStr>>(args: &[S]) -> [u32; 2] {
    let mut nums = args
        .iter()
        .filter_map(|a| a.as_ref().to_str()?.trim().parse::<i32>().ok())
        .filter(|&v| v > 0)
        .map(|v| v as u32);
    match [nums.next(), nums.next()] {
        [Some(w), Some(h)] => [w, h],
        _ => DEFAULT_SIZE,
    }
}

fn parse_width(s: &str) -> Option<F> {
    s.parse::<F>().ok().filter(|w| w.is_finite() && *w > 0.)
}

/// Value of the first token for `setting` that `parse` accepts.
fn first_parsed<S: AsRef<OsStr>, T>(
    args: &[S],
    setting: Setting,
    parse: impl Fn(&str) -> Option<T>,
    diag: &mut impl Write,
) -> io::Result<Option<T>> {
    for a in args {
        let a = a.as_ref().to_string_lossy().to_lowercase();
        let Some(rest) = a.strip_prefix(setting.prefix()) else {
            continue;
        };
        if let Some(v) = parse(rest) {
            return Ok(Some(v));
        }
        writeln!(diag, "Couldn't parse {} from {rest}.", setting.name())?;
    }
    Ok(None)
}

#[cfg(test)]
fn resolve(args: &[&str]) -> (RenderConfig, String) {
    let mut diag = vec![];
    let cfg = RenderConfig::from_args(args, &mut diag).unwrap();
    (cfg, String::from_utf8(diag).unwrap())
}

#[test]
fn test_size() {
    assert_eq!(parse_size::<&str>(&[]), DEFAULT_SIZE);
    assert_eq!(parse_size(&["300"]), DEFAULT_SIZE);
    assert_eq!(parse_size(&["0", "-5", "300", "abc"]), DEFAULT_SIZE);
    assert_eq!(parse_size(&["color:red", "300", "x", "200", "7"]), [300, 200]);
    assert_eq!(parse_size(&["+64", "penwidth:3", "1.5", "32"]), [64, 32]);
    assert_eq!(parse_size(&["99999999999", "10", "20"]), [10, 20]);
    assert_eq!(parse_size(&[" 640", "480\t", "1 2"]), [640, 480]);
}

#[test]
fn test_defaults() {
    let (cfg, diag) = resolve(&["no/such/file.msh"]);
    assert_eq!(cfg, RenderConfig::default());
    assert!(diag.is_empty());
}

#[test]
fn test_pen_color() {
    let (cfg, diag) = resolve(&["COLOR:Red"]);
    assert_eq!(cfg.pen.color, Rgba([255, 0, 0, 255]));
    assert!(diag.is_empty());

    let (cfg, _) = resolve(&["color:ff00ff"]);
    assert_eq!(cfg.pen.color, Rgba([255, 0, 255, 0]));

    let (cfg, diag) = resolve(&["color:notacolor"]);
    assert_eq!(cfg.pen.color, BLACK);
    assert_eq!(diag, "Couldn't parse pen color from notacolor.\n");

    // stops at the first success
    let (cfg, diag) = resolve(&["color:bad", "color:blue", "color:nope", "color:red"]);
    assert_eq!(cfg.pen.color, Rgba([0, 0, 255, 255]));
    assert_eq!(diag.lines().count(), 1);
}

#[test]
fn test_background() {
    let (cfg, diag) = resolve(&["backgound:white", "background:red"]);
    assert_eq!(cfg.background, Rgba([255; 4]));
    assert!(diag.is_empty());

    // the conventional spelling is not recognized
    let (cfg, diag) = resolve(&["background:red"]);
    assert_eq!(cfg.background, TRANSPARENT);
    assert!(diag.is_empty());

    let (cfg, diag) = resolve(&["backgound:zzz", "backgound:ff000080"]);
    assert_eq!(cfg.background, Rgba([0, 0, 128, 255]));
    assert_eq!(diag, "Couldn't parse background color from zzz.\n");
}

#[test]
fn test_pen_width() {
    let (cfg, diag) = resolve(&["penwidth:2.5"]);
    assert_eq!(cfg.pen.width, 2.5);
    assert!(diag.is_empty());

    let (cfg, diag) = resolve(&["penwidth:2,5", "PenWidth:-1", "penwidth:0.75"]);
    assert_eq!(cfg.pen.width, 0.75);
    assert_eq!(
        diag,
        "Couldn't parse pen width from 2,5.\nCouldn't parse pen width from -1.\n"
    );

    let (cfg, _) = resolve(&["penwidth:nan"]);
    assert_eq!(cfg.pen.width, 1.);
}
