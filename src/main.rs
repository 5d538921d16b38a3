use iced::widget::{canvas, container, shader, Stack};
use iced::{Color, Element, Length, Subscription, Task, Theme};
use std::sync::Arc;
use std::time::Instant;

mod capture;
mod gpu;
mod sensor;
mod state;
mod ui;

use sensor::{HandSensor, ReplaySensor, SyntheticSensor};
use state::{SensorSource, Viewer, ViewerConfig};
use ui::{HandOverlay, UndistortView};

/// Main application state
struct LeapUndistort {
    /// Sensor polling and the current frame/capture
    viewer: Viewer,
    config: ViewerConfig,
    /// Connection state seen on the previous tick
    sensor_connected: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Fixed-rate update tick
    Tick(Instant),
}

impl LeapUndistort {
    fn new(config: ViewerConfig) -> (Self, Task<Message>) {
        let sensor = open_sensor(&config.source);
        log::info!(
            "🖐  Viewer initialized: {}x{} @ {} Hz",
            config.window_width,
            config.window_height,
            config.frame_rate
        );

        (
            LeapUndistort {
                viewer: Viewer::new(sensor),
                config,
                sensor_connected: false,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(_) => {
                let connected = self.viewer.tick().sensor_connected();
                if connected != self.sensor_connected {
                    if connected {
                        log::info!("✅ Sensor connected");
                    } else {
                        log::warn!("⚠️  Sensor disconnected");
                    }
                    self.sensor_connected = connected;
                }
                Task::none()
            }
        }
    }

    /// Undistorted camera image (once a capture exists) with the hand overlay on top
    fn view(&self) -> Element<Message> {
        let mut layers = Stack::new().width(Length::Fill).height(Length::Fill);

        if let Some(capture) = self.viewer.capture() {
            layers = layers.push(
                shader(UndistortView {
                    capture: Arc::clone(capture),
                })
                .width(Length::Fill)
                .height(Length::Fill),
            );
        }

        let markers = self
            .viewer
            .frame()
            .map(ui::overlay::markers)
            .unwrap_or_default();
        layers = layers.push(
            canvas(HandOverlay {
                markers,
                palm_radius: self.config.palm_radius,
                tip_radius: self.config.tip_radius,
                field_of_view: self.config.field_of_view,
            })
            .width(Length::Fill)
            .height(Length::Fill),
        );

        container(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme: &Theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..Default::default()
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(self.config.tick_interval()).map(Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Open the configured frame source, falling back to the synthetic one
fn open_sensor(source: &SensorSource) -> Box<dyn HandSensor> {
    match source {
        SensorSource::Synthetic => {
            log::info!("Using synthetic sensor");
            Box::new(SyntheticSensor::new())
        }
        SensorSource::Replay { path, looping } => match ReplaySensor::open(path, *looping) {
            Ok(sensor) => Box::new(sensor),
            Err(err) => {
                log::error!("{}; falling back to synthetic sensor", err);
                Box::new(SyntheticSensor::new())
            }
        },
    }
}

fn main() -> iced::Result {
    env_logger::init();

    let config = ViewerConfig::load();
    let window_size = (config.window_width, config.window_height);

    iced::application(
        "Leap Undistort",
        LeapUndistort::update,
        LeapUndistort::view,
    )
    .subscription(LeapUndistort::subscription)
    .theme(LeapUndistort::theme)
    .window_size(window_size)
    .resizable(false)
    .centered()
    .run_with(move || LeapUndistort::new(config))
}
