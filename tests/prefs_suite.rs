use std::path::PathBuf;
use tui_tunnel::prefs::{PrefsError, TunnelPrefs};

struct TempPrefs {
    path: PathBuf,
}

impl TempPrefs {
    fn new(tag: &str) -> Self {
        let path = std::env::temp_dir()
            .join(format!("tui_tunnel_prefs_{}_{}", tag, std::process::id()))
            .join("prefs.txt");
        Self { path }
    }
}

impl Drop for TempPrefs {
    fn drop(&mut self) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }
}

#[test]
fn missing_file_yields_defaults() {
    let tmp = TempPrefs::new("missing");
    let prefs = TunnelPrefs::load(Some(&tmp.path)).expect("load");
    assert_eq!(prefs, TunnelPrefs::default());
}

#[test]
fn no_path_yields_defaults_and_save_is_a_noop() {
    let prefs = TunnelPrefs::load(None).expect("load");
    assert_eq!(prefs, TunnelPrefs::default());
    prefs.save(None).expect("save without a path must succeed");
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempPrefs::new("roundtrip");
    let saved = TunnelPrefs {
        speed: 9.35,
        warp: 2.5,
        thickness: 0.44,
        color_shift: -0.15,
        variant: 4,
    };
    saved.save(Some(&tmp.path)).expect("save");

    let loaded = TunnelPrefs::load(Some(&tmp.path)).expect("load");
    assert_eq!(loaded, saved);

    // Atomic write must not leave the temp file behind.
    assert!(
        !tmp.path.with_extension("tmp").exists(),
        "temp file left after save"
    );
}

#[test]
fn unknown_keys_and_comments_are_ignored() {
    let tmp = TempPrefs::new("unknown");
    std::fs::create_dir_all(tmp.path.parent().unwrap()).unwrap();
    std::fs::write(
        &tmp.path,
        "# comment\n\nspeed=3.5\nfuture_knob=42\nvariant=2\n",
    )
    .unwrap();

    let prefs = TunnelPrefs::load(Some(&tmp.path)).expect("load");
    assert_eq!(prefs.speed, 3.5);
    assert_eq!(prefs.variant, 2);
    assert_eq!(prefs.warp, TunnelPrefs::default().warp);
}

#[test]
fn malformed_line_reports_its_line_number() {
    let tmp = TempPrefs::new("malformed");
    std::fs::create_dir_all(tmp.path.parent().unwrap()).unwrap();
    std::fs::write(&tmp.path, "speed=2.0\nnot a pair\n").unwrap();

    match TunnelPrefs::load(Some(&tmp.path)) {
        Err(PrefsError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error with line number, got {other:?}"),
    }
}

#[test]
fn non_numeric_value_is_rejected() {
    let tmp = TempPrefs::new("nonnum");
    std::fs::create_dir_all(tmp.path.parent().unwrap()).unwrap();
    std::fs::write(&tmp.path, "warp=sideways\n").unwrap();

    match TunnelPrefs::load(Some(&tmp.path)) {
        Err(PrefsError::Parse { line, message }) => {
            assert_eq!(line, 1);
            assert!(message.contains("warp"), "message should name the key: {message}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn non_finite_value_is_rejected() {
    let tmp = TempPrefs::new("nonfinite");
    std::fs::create_dir_all(tmp.path.parent().unwrap()).unwrap();
    std::fs::write(&tmp.path, "thickness=NaN\n").unwrap();

    assert!(
        TunnelPrefs::load(Some(&tmp.path)).is_err(),
        "NaN must not load as a tuning value"
    );
}
