use indicatif::{ProgressBar, ProgressStyle};
use tokenplan_engine::{EngineEvent, ProgressSink, Stage};

const BAR_TEMPLATE: &str = "{spinner} {msg:<24} [{bar:32}] {bytes}/{total_bytes} ({eta})";
const SPINNER_TEMPLATE: &str = "{spinner} {msg} {bytes}";

/// Renders engine progress on stderr.
pub struct BarProgressSink {
    bar: ProgressBar,
}

impl BarProgressSink {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    fn set_template(&self, template: &str) {
        if let Ok(style) = ProgressStyle::with_template(template) {
            self.bar.set_style(style.progress_chars("=> "));
        }
    }
}

impl ProgressSink for BarProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Stage(Stage::Extracting) => {
                self.bar.set_message("reading dataset");
            }
            EngineEvent::Stage(Stage::Loading) => {
                self.set_template(SPINNER_TEMPLATE);
                self.bar.set_message("loading tokenizers");
            }
            EngineEvent::Stage(Stage::Tokenizing) => {
                self.set_template(BAR_TEMPLATE);
                self.bar.set_position(0);
                self.bar.set_message("tokenizing");
            }
            EngineEvent::Stage(Stage::Done) => self.bar.finish_and_clear(),
            EngineEvent::Downloading { model, bytes } => {
                self.bar.set_message(format!("downloading {model}"));
                self.bar.set_position(bytes);
            }
            EngineEvent::Tokenizing {
                processed_bytes,
                total_bytes,
            } => {
                self.bar.set_length(total_bytes);
                self.bar.set_position(processed_bytes);
            }
        }
    }
}
