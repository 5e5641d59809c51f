use rand::{Rng, rngs::ThreadRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Supplies the colour of each series. Implementations get the source key so
/// they may derive the colour from it, and are free to ignore it.
pub trait ColorSource {
    fn color_for(&mut self, source: &str) -> String;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ColorMode {
    /// New random colour on every run
    Random,
    /// Stable colour derived from the source key
    #[default]
    Hashed,
}

impl ColorMode {
    pub fn source(&self) -> Box<dyn ColorSource> {
        match self {
            Self::Random => Box::new(RandomColor::<ThreadRng>::default()),
            Self::Hashed => Box::new(KeyHashColor),
        }
    }
}

fn hex_color(rgb: u32) -> String {
    format!("#{:06x}", rgb & 0xff_ffff)
}

/// Uniformly random 24-bit colour
pub struct RandomColor<R: Rng = ThreadRng> {
    rng: R,
}

impl Default for RandomColor {
    fn default() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl<R: Rng> RandomColor<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ColorSource for RandomColor<R> {
    fn color_for(&mut self, _source: &str) -> String {
        hex_color(self.rng.gen_range(0..=0xff_ffff))
    }
}

/// First three bytes of the SHA-256 of the source key
pub struct KeyHashColor;

impl ColorSource for KeyHashColor {
    fn color_for(&mut self, source: &str) -> String {
        let digest = Sha256::digest(source.as_bytes());
        hex_color(u32::from_be_bytes([0, digest[0], digest[1], digest[2]]))
    }
}

/// The same colour for every series
pub struct FixedColor(pub String);

impl ColorSource for FixedColor {
    fn color_for(&mut self, _source: &str) -> String {
        self.0.clone()
    }
}
