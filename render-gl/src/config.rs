//! Backend tunables.

use config::Config;

#[derive(Copy, Clone, Debug)]
pub struct GlBackendConfig {
    /// Byte size of the persistently mapped streaming ring. Uploads
    /// larger than this fall back to the one-shot discipline.
    pub upload_ring_size: usize,
}

impl Default for GlBackendConfig {
    fn default() -> Self {
        GlBackendConfig {
            upload_ring_size: 4 * 1024 * 1024,
        }
    }
}

impl GlBackendConfig {
    /// Reads `gl.upload_ring_size`, keeping the default for missing or
    /// nonsensical values.
    pub fn from_config(cfg: &Config) -> GlBackendConfig {
        let mut out = GlBackendConfig::default();
        if let Ok(size) = cfg.get_int("gl.upload_ring_size") {
            if size > 0 {
                out.upload_ring_size = size as usize;
            }
        }
        out
    }
}
