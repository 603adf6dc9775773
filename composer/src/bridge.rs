use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use composer_core::{char_offset_from_utf16, utf16_offset_from_chars, Key};

use crate::engine::ComposerEngine;
use crate::host::CommandBuffer;
use crate::protocol::{
    CommandEnvelope, ErrorCode, ErrorResponse, HostCommand, HostEvent, HostMessage,
};

/// Drives a [`ComposerEngine`] from line-delimited JSON host events and
/// writes the resulting host commands back, one JSON object per line.
///
/// Carets on the wire are UTF-16 code units, as browser text widgets count
/// them; the engine counts chars.
pub struct ComposerBridge {
    engine: ComposerEngine<CommandBuffer>,
}

impl ComposerBridge {
    pub fn new(engine: ComposerEngine<CommandBuffer>) -> Self {
        Self { engine }
    }

    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        info!("composer bridge reading host events");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let envelopes = self.process_line(&line);
                    write_envelopes(&mut writer, &envelopes).await?;
                }
                Some(completion) = self.engine.next_completion() => {
                    let applied = self.engine.apply_completion(completion);
                    debug!(?applied, "applied completion");
                    let envelopes = self.drain(String::new());
                    write_envelopes(&mut writer, &envelopes).await?;
                }
            }
        }

        info!("host closed the event stream");
        Ok(())
    }

    pub fn process_line(&mut self, line: &str) -> Vec<CommandEnvelope> {
        match serde_json::from_str::<HostMessage>(line) {
            Ok(message) => self.handle_message(message),
            Err(error) => {
                error!("invalid host event JSON: {error}");
                vec![CommandEnvelope {
                    id: String::new(),
                    command: HostCommand::Error(ErrorResponse {
                        code: ErrorCode::InvalidRequest,
                        message: format!("invalid JSON payload: {error}"),
                    }),
                }]
            }
        }
    }

    fn handle_message(&mut self, message: HostMessage) -> Vec<CommandEnvelope> {
        let id = message.id;
        let mut key_result = None;
        match message.event {
            HostEvent::TextChange { text, caret } => {
                let caret = char_offset_from_utf16(&text, caret);
                self.engine.on_text_change(text, caret);
            }
            HostEvent::Key(event) => {
                let disposition = self.engine.on_key_event(Key::from(&event));
                key_result = Some(HostCommand::KeyResult {
                    consumed: disposition.is_consumed(),
                });
            }
            HostEvent::Pick { candidate } => {
                if self.engine.on_suggestion_pick(&candidate).is_none() {
                    debug!(candidate = %candidate, "pick ignored, caret is not on a word");
                }
            }
            HostEvent::Hover { index } => self.engine.on_suggestion_hover(index),
            HostEvent::Transliterate => {
                self.engine.request_full_transliteration();
            }
            HostEvent::LanguageCheck {
                armed,
                current_language,
            } => self.engine.update_language_check(armed, current_language),
            HostEvent::Toggle { enable } => self.engine.set_transliteration_enabled(enable),
            HostEvent::Ping => self.engine.host_mut().push(HostCommand::Pong),
        }

        let mut envelopes = Vec::new();
        if let Some(command) = key_result {
            envelopes.push(CommandEnvelope {
                id: id.clone(),
                command,
            });
        }
        envelopes.extend(self.drain(id));
        envelopes
    }

    fn drain(&mut self, id: String) -> Vec<CommandEnvelope> {
        let commands = self.engine.host_mut().drain();
        let text = &self.engine.state().text;
        commands
            .into_iter()
            .map(|command| match command {
                HostCommand::Caret { caret } => HostCommand::Caret {
                    caret: utf16_offset_from_chars(text, caret),
                },
                command => command,
            })
            .map(|command| CommandEnvelope {
                id: id.clone(),
                command,
            })
            .collect()
    }
}

async fn write_envelopes<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelopes: &[CommandEnvelope],
) -> Result<()> {
    for envelope in envelopes {
        let payload = serde_json::to_string(envelope)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}
