pub mod nijivoice;

pub use nijivoice::NijivoiceSynthesizer;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Render the script as spoken audio, returning the encoded bytes.
    async fn synthesize(&self, script: &str) -> Result<Vec<u8>>;
    /// Container format of the returned bytes, e.g. "mp3".
    fn audio_format(&self) -> &'static str;
    fn name(&self) -> &'static str;
}
