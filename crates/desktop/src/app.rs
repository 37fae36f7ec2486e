use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::image;
use iced::widget::{button, checkbox, column, container, pick_list, row, slider, text, Space};
use iced::{Element, Length, Subscription, Task, Theme};

use framesight_core::pipeline::cancel::CancelToken;
use framesight_core::pipeline::capture_session::SessionOutcome;
use framesight_core::shared::constants::DEFAULT_CAMERA_INDEX;
use framesight_core::shared::source::{Source, VIDEO_EXTENSIONS};

use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::workers::capture_worker::{self, CaptureEvent, CaptureParams, ViewportFrame};
use crate::workers::model_cache::ModelCache;

const PROJECT_URL: &str = "https://github.com/framesight/framesight";

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    SelectFile,
    FileSelected(Option<PathBuf>),
    UseCamera,
    Start,
    Stop,
    Poll,
    ConfidenceChanged(u32),
    DrawLabelsChanged(bool),
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    PollSystemTheme,
    OpenWebsite,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

enum RunState {
    Idle,
    Running {
        events: Receiver<CaptureEvent>,
        frames: Receiver<ViewportFrame>,
        cancel: CancelToken,
    },
}

pub struct App {
    settings: Settings,
    source: Option<Source>,
    run: RunState,
    status: String,
    viewport: Option<image::Handle>,
    model_cache: Arc<ModelCache>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                settings: Settings::load(),
                source: None,
                run: RunState::Idle,
                status: "Select a video file or camera to begin".to_string(),
                viewport: None,
                model_cache: ModelCache::new(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select video file")
                            .add_filter("Video Files", VIDEO_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::FileSelected,
                );
            }
            Message::FileSelected(Some(path)) => {
                self.status = format!("Selected {}", path.display());
                self.source = Some(Source::File(path));
            }
            Message::FileSelected(None) => {
                self.status = "File selection cancelled".to_string();
            }
            Message::UseCamera => {
                let source = Source::Device(DEFAULT_CAMERA_INDEX);
                self.status = format!("Selected {}", source.describe());
                self.source = Some(source);
            }
            Message::Start => {
                if matches!(self.run, RunState::Running { .. }) {
                    return Task::none();
                }
                let Some(source) = self.source.clone() else {
                    self.status = "No source selected".to_string();
                    return Task::none();
                };
                let (events, frames, cancel) = capture_worker::spawn(CaptureParams {
                    source,
                    confidence: self.settings.confidence,
                    draw_labels: self.settings.draw_labels,
                    model_cache: self.model_cache.clone(),
                });
                self.run = RunState::Running {
                    events,
                    frames,
                    cancel,
                };
                self.status = "Starting capture...".to_string();
            }
            Message::Stop => {
                if let RunState::Running { ref cancel, .. } = self.run {
                    cancel.cancel();
                    self.status = "Stopping...".to_string();
                }
            }
            Message::Poll => {
                self.poll_worker();
            }
            Message::ConfidenceChanged(val) => {
                self.settings.confidence = val;
                self.settings.save();
            }
            Message::DrawLabelsChanged(enabled) => {
                self.settings.draw_labels = enabled;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render,
                // so just requesting a redraw is enough.
            }
            Message::OpenWebsite => {
                let _ = open::that(PROJECT_URL);
            }
        }
        Task::none()
    }

    /// Drain both worker channels. Keeps only the newest frame and applies
    /// any terminal event.
    fn poll_worker(&mut self) {
        let mut finished = None;
        if let RunState::Running {
            ref events,
            ref frames,
            ..
        } = self.run
        {
            let mut latest = None;
            while let Ok(frame) = frames.try_recv() {
                latest = Some(frame);
            }
            if let Some(frame) = latest {
                self.status = format!("Capturing {}x{}", frame.width, frame.height);
                self.viewport = Some(image::Handle::from_rgba(
                    frame.width,
                    frame.height,
                    frame.rgba,
                ));
            }

            while let Ok(event) = events.try_recv() {
                match event {
                    CaptureEvent::DownloadProgress(dl, total) => {
                        self.status = if total > 0 {
                            format!("Downloading model... {}%", dl * 100 / total)
                        } else {
                            format!("Downloading model... {dl} bytes")
                        };
                    }
                    CaptureEvent::Finished(report) => {
                        finished = Some(match report.outcome {
                            SessionOutcome::Ended => format!(
                                "Stream ended: {} frames, {} detections",
                                report.frames_read, report.detections
                            ),
                            SessionOutcome::Stopped => {
                                format!("Stopped after {} frames", report.frames_read)
                            }
                        });
                    }
                    CaptureEvent::Error(e) => finished = Some(format!("Error: {e}")),
                    CaptureEvent::Cancelled => finished = Some("Stopped".to_string()),
                }
            }
        }
        if let Some(status) = finished {
            self.status = status;
            self.run = RunState::Idle;
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let running = matches!(self.run, RunState::Running { .. });

        let source_label = match self.source {
            Some(ref source) => source.describe(),
            None => "No source selected".to_string(),
        };

        let run_button = if running {
            button(text("Stop").size(14))
                .on_press(Message::Stop)
                .style(button::danger)
                .padding([8, 24])
        } else {
            button(text("Start").size(14))
                .on_press(Message::Start)
                .style(button::primary)
                .padding([8, 24])
        };

        let controls = row![
            button(text("Open Video...").size(13)).on_press(Message::SelectFile),
            button(text("Use Camera").size(13)).on_press(Message::UseCamera),
            text(source_label).size(13),
            Space::new().width(Length::Fill),
            run_button,
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);

        let viewport: Element<'_, Message> = match self.viewport {
            Some(ref handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(iced::ContentFit::Contain)
                .into(),
            None => text("No video").size(16).into(),
        };
        let viewport = container(viewport)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill);

        let settings_bar = row![
            text("Confidence").size(13),
            slider(0..=100u32, self.settings.confidence, Message::ConfidenceChanged).width(140),
            text(format!("{}%", self.settings.confidence)).size(13),
            checkbox(self.settings.draw_labels)
                .label("Labels")
                .on_toggle(Message::DrawLabelsChanged)
                .text_size(13),
            pick_list(Appearance::ALL, Some(self.settings.appearance), |a| {
                Message::AppearanceChanged(a)
            })
            .text_size(13),
            checkbox(self.settings.high_contrast)
                .label("High contrast")
                .on_toggle(Message::HighContrastChanged)
                .text_size(13),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);

        let status_bar = row![
            text(&self.status).size(12),
            Space::new().width(Length::Fill),
            button(text("framesight on GitHub").size(11))
                .on_press(Message::OpenWebsite)
                .style(button::text),
        ]
        .align_y(iced::Alignment::Center);

        column![controls, viewport, settings_bar, status_bar]
            .spacing(12)
            .padding(16)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subs = Vec::new();
        if matches!(self.run, RunState::Running { .. }) {
            subs.push(iced::time::every(Duration::from_millis(33)).map(|_| Message::Poll));
            subs.push(iced::keyboard::listen().filter_map(|event| match event {
                iced::keyboard::Event::KeyPressed {
                    key: iced::keyboard::Key::Named(iced::keyboard::key::Named::Escape),
                    ..
                } => Some(Message::Stop),
                _ => None,
            }));
        }
        if self.settings.appearance == Appearance::System {
            subs.push(iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme));
        }
        Subscription::batch(subs)
    }
}
