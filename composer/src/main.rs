use anyhow::Result;
use composer::{CommandBuffer, ComposerBridge, ComposerConfig, ComposerEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ComposerConfig::load()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log.filter.parse()?))
        .init();

    let transliteration = config.transliteration.as_ref();
    info!(
        transliteration = transliteration.is_some(),
        provider = transliteration.map(|t| t.provider.as_str()).unwrap_or(""),
        max_suggestions = transliteration.map(|t| t.max_suggestions).unwrap_or(0),
        language_detection = config.language_detection.enable,
        active_locale = %config.language_detection.active_locale,
        "loaded composer config"
    );

    let engine = ComposerEngine::from_config(&config, CommandBuffer::new());
    let mut bridge = ComposerBridge::new(engine);
    bridge.run(tokio::io::stdin(), tokio::io::stdout()).await
}
