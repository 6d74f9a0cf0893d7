use std::fmt;
use std::path::{Path, PathBuf};

/// Tuning state persisted across runs. Values are re-clamped by the
/// effect layer on use, so a hand-edited file cannot break rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelPrefs {
    pub speed: f32,
    pub warp: f32,
    pub thickness: f32,
    pub color_shift: f32,
    pub variant: usize,
}

impl Default for TunnelPrefs {
    fn default() -> Self {
        Self {
            speed: 6.0,
            warp: 1.0,
            thickness: 0.18,
            color_shift: 0.0,
            variant: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Io(String),
    Parse { line: usize, message: String },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for PrefsError {}

impl TunnelPrefs {
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };

        let mut prefs = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(PrefsError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            match key {
                "speed" => prefs.speed = parse_f32(key, value, line_no)?,
                "warp" => prefs.warp = parse_f32(key, value, line_no)?,
                "thickness" => prefs.thickness = parse_f32(key, value, line_no)?,
                "color_shift" => prefs.color_shift = parse_f32(key, value, line_no)?,
                "variant" => {
                    prefs.variant = value.parse().map_err(|_| PrefsError::Parse {
                        line: line_no,
                        message: "variant must be a non-negative integer".to_string(),
                    })?;
                }
                // Unknown keys are ignored so newer files still load.
                _ => {}
            }
        }
        Ok(prefs)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let body = format!(
            "# tui_tunnel runtime prefs v1\nspeed={}\nwarp={}\nthickness={}\ncolor_shift={}\nvariant={}\n",
            self.speed, self.warp, self.thickness, self.color_shift, self.variant
        );
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &body).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }
}

pub fn prefs_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("tui_tunnel").join("prefs.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("tui_tunnel")
            .join("prefs.txt"),
    )
}

fn parse_f32(key: &str, raw: &str, line_no: usize) -> Result<f32, PrefsError> {
    let v: f32 = raw.parse().map_err(|_| PrefsError::Parse {
        line: line_no,
        message: format!("{key} must be a number"),
    })?;
    if !v.is_finite() {
        return Err(PrefsError::Parse {
            line: line_no,
            message: format!("{key} must be finite"),
        });
    }
    Ok(v)
}
