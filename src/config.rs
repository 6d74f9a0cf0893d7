use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "tui-tunnel", version, about = "Procedural warp-tunnel visualizer for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = Quality::High)]
    pub quality: Quality,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub adaptive_quality: bool,

    /// Initial variant: index or name substring.
    #[arg(long)]
    pub variant: Option<String>,

    #[arg(long, default_value_t = false)]
    pub auto_cycle: bool,

    #[arg(long, default_value_t = 20.0)]
    pub seconds_per_switch: f32,

    #[arg(long, default_value_t = false)]
    pub shuffle: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Forward speed (default 6.0; overrides saved prefs).
    #[arg(long)]
    pub speed: Option<f32>,

    /// Angular distortion strength (default 1.0; overrides saved prefs).
    #[arg(long)]
    pub warp: Option<f32>,

    /// Wall band thickness (default 0.18; overrides saved prefs).
    #[arg(long)]
    pub thickness: Option<f32>,

    /// Palette rotation (default 0.0; overrides saved prefs).
    #[arg(long)]
    pub color_shift: Option<f32>,

    /// Skip loading/saving the prefs file.
    #[arg(long, default_value_t = false)]
    pub no_prefs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Quality {
    Ultra,
    High,
    Balanced,
    Fast,
}

impl Quality {
    pub fn lower(self) -> Self {
        match self {
            Self::Ultra => Self::High,
            Self::High => Self::Balanced,
            Self::Balanced => Self::Fast,
            Self::Fast => Self::Fast,
        }
    }

    pub fn higher(self) -> Self {
        match self {
            Self::Fast => Self::Balanced,
            Self::Balanced => Self::High,
            Self::High => Self::Ultra,
            Self::Ultra => Self::Ultra,
        }
    }

    /// Sample block edge in pixels; blocks larger than 1 decimate the
    /// shade evaluations and replicate the result.
    pub fn block_scale(self) -> usize {
        match self {
            Self::Ultra | Self::High => 1,
            Self::Balanced => 2,
            Self::Fast => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ultra => "ultra",
            Self::High => "high",
            Self::Balanced => "balanced",
            Self::Fast => "fast",
        }
    }
}
