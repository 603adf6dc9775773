use composer_core::SuggestionSet;

use crate::protocol::HostCommand;

/// The text widget and surrounding chrome the composer drives.
pub trait ComposerHost {
    fn commit_text(&mut self, text: &str);

    /// Moves the caret and focuses the widget. Always called after
    /// [`commit_text`](Self::commit_text) for the same edit.
    fn reposition_caret(&mut self, caret: usize);

    fn show_suggestions(&mut self, suggestions: &SuggestionSet);

    fn show_language_popup(&mut self);

    fn transliteration_finished(&mut self) {}
}

#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<HostCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: HostCommand) {
        self.commands.push(command);
    }

    pub fn drain(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }
}

impl ComposerHost for CommandBuffer {
    fn commit_text(&mut self, text: &str) {
        self.push(HostCommand::Text {
            text: text.to_string(),
        });
    }

    fn reposition_caret(&mut self, caret: usize) {
        self.push(HostCommand::Caret { caret });
    }

    fn show_suggestions(&mut self, suggestions: &SuggestionSet) {
        self.push(HostCommand::Suggestions {
            candidates: suggestions.candidates.clone(),
            active_index: suggestions.active_index,
        });
    }

    fn show_language_popup(&mut self) {
        self.push(HostCommand::LanguagePopup);
    }

    fn transliteration_finished(&mut self) {
        self.push(HostCommand::TransliterateDone);
    }
}
