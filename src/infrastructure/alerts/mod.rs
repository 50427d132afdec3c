mod chime;

pub use chime::{render_chime_wav, SynthChime};
