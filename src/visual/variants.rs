//! The variant table: six looks over one configurable core.
//!
//! Marched variants carry their full constant set in `MarchCfg`; the
//! polar variants are closed-form screen-space mappings whose constants
//! live with their shading code.

/// Constants for one raymarched look. Everything the marcher and its
/// compositor need, so the shading code itself stays variant-free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchCfg {
    pub iterations: u32,
    pub max_travel: f32,
    pub min_step: f32,
    pub step_gain: f32,
    pub hit_sharpness: f32,

    pub wave_amp: f32,
    pub ring_amp: f32,
    pub ring_drift: f32,

    pub noise_scale: f32,
    pub noise_drift: (f32, f32),
    pub layer_freq: f32,
    pub layer_noise: f32,
    pub layer_rate: f32,

    pub proj_depth: f32,
    pub pitch_amp: f32,

    pub fog_falloff: f32,
    pub accum_gain: f32,
    pub glow_gain: f32,
    pub intensity_cap: f32,
    pub palette_rate: f32,
    pub palette_depth: f32,
    pub vein_freq: f32,
    pub vein_rate: f32,
    pub vein_noise: f32,
    pub vein_gain: f32,
    pub vignette: (f32, f32),
    pub background: [f32; 3],
    pub gamma: f32,

    /// Per-channel accumulation with swirl, drift and chromatic smear.
    pub chromatic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Family {
    March(MarchCfg),
    CornerBend,
    FlowerBurst,
    RingLattice,
    HammerVortex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variant {
    pub name: &'static str,
    pub family: Family,
}

const PLASMA_MARCH: MarchCfg = MarchCfg {
    iterations: 120,
    max_travel: 100.0,
    min_step: 0.02,
    step_gain: 0.5,
    hit_sharpness: 20.0,

    wave_amp: 0.3,
    ring_amp: 0.2,
    ring_drift: 0.5,

    noise_scale: 1.3,
    noise_drift: (0.5, 0.3),
    layer_freq: 8.0,
    layer_noise: 3.0,
    layer_rate: 2.0,

    proj_depth: 1.5,
    pitch_amp: 0.3,

    fog_falloff: 0.02,
    accum_gain: 0.6,
    glow_gain: 0.8,
    intensity_cap: 2.5,
    palette_rate: 0.1,
    palette_depth: 0.02,
    vein_freq: 20.0,
    vein_rate: 2.5,
    vein_noise: 10.0,
    vein_gain: 0.15,
    vignette: (1.2, 0.2),
    background: [0.02, 0.02, 0.03],
    gamma: 0.8,

    chromatic: false,
};

const CHROMA_MARCH: MarchCfg = MarchCfg {
    iterations: 140,
    max_travel: 200.0,
    min_step: 0.015,
    step_gain: 0.45,
    hit_sharpness: 24.0,

    wave_amp: 0.35,
    ring_amp: 0.22,
    ring_drift: 0.6,

    noise_scale: 1.6,
    noise_drift: (0.6, 0.4),
    layer_freq: 10.0,
    layer_noise: 4.0,
    layer_rate: 3.0,

    proj_depth: 1.6,
    pitch_amp: 0.5,

    fog_falloff: 0.018,
    accum_gain: 0.55,
    glow_gain: 0.9,
    intensity_cap: 3.0,
    palette_rate: 0.12,
    palette_depth: 0.018,
    vein_freq: 30.0,
    vein_rate: 3.2,
    vein_noise: 12.0,
    vein_gain: 0.12,
    vignette: (1.3, 0.18),
    background: [0.015, 0.015, 0.02],
    gamma: 0.85,

    chromatic: true,
};

pub fn make_variants() -> Vec<Variant> {
    vec![
        Variant {
            name: "Plasma Drift: Breathing Walls",
            family: Family::March(PLASMA_MARCH),
        },
        Variant {
            name: "Chroma Twirl: Split Spectrum",
            family: Family::March(CHROMA_MARCH),
        },
        Variant {
            name: "Corner Run: Eased Bends",
            family: Family::CornerBend,
        },
        Variant {
            name: "Flower Burst: Petal Rings",
            family: Family::FlowerBurst,
        },
        Variant {
            name: "Ring Lattice: Crisp Bands",
            family: Family::RingLattice,
        },
        Variant {
            name: "Hammer Vortex: Violent Twist",
            family: Family::HammerVortex,
        },
    ]
}
