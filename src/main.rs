#![deny(unused_doc_comments)]

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use iced::time::{self, Duration, Instant};
use iced::widget::{container, image, stack, Space};
use iced::{window, Background, Color, ContentFit, Element, Length, Size, Subscription, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod background;
mod clock;
mod error;
mod state;
mod ui;

use background::{fetch, uri, BackgroundImage, Completion, FetchSource, FetchTicket, RefreshDecision, RefreshState, Step, Transition};
use clock::ClockFace;
use state::data::IntervalClass;
use state::settings::SettingsStore;
use ui::Flyout;

/// Window size until the first resize event arrives
const DEFAULT_WINDOW_SIZE: Size = Size {
    width: 1280.0,
    height: 800.0,
};

/// Main application state
struct ClockScreen {
    /// Persisted preferences
    settings: SettingsStore,
    /// When to fetch the next background, and whether one is loading
    refresh: RefreshState,
    /// Strings shown by the clock overlay
    face: ClockFace,
    /// Background currently on screen
    background: Option<BackgroundImage>,
    /// Fade between the current and the next background
    transition: Transition<BackgroundImage>,
    window_size: Size,
    /// Settings panel currently open
    flyout: Option<Flyout>,
    http: reqwest::Client,
    /// Where the last downloaded photo is kept
    cache_path: PathBuf,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// 100ms tick: redraw the clock
    ClockTick,
    /// 1s tick: check whether the background is due
    RefreshTick,
    /// Animation frame while a fade is running
    TransitionFrame(Instant),
    WindowResized(Size),
    /// A fetch finished
    BackgroundLoaded(FetchTicket, Result<BackgroundImage, Arc<error::Error>>),
    OpenFlyout(Flyout),
    CloseFlyout,
    ThemeSelected(String),
    IntervalSelected(IntervalClass),
    LongTimeFormatToggled(bool),
    WorldTimeToggled(bool),
    ClockNameChanged(usize, String),
    ClockZoneSelected(usize, Tz),
}

impl ClockScreen {
    /// Create the screen from the user's settings and cache locations
    fn new() -> (Self, Task<Message>) {
        Self::with_store(SettingsStore::load_default(), fetch::cache_path())
    }

    /// Create the screen, show the cached photo and run the first refresh check
    fn with_store(settings: SettingsStore, cache_path: PathBuf) -> (Self, Task<Message>) {
        let refresh = RefreshState::new(settings.get().last_background_change);
        let face = ClockFace::compose(&Local::now(), settings.get());

        let http = match reqwest::Client::builder()
            .user_agent(concat!("unsplash-clock/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "could not configure HTTP client, using defaults");
                reqwest::Client::new()
            }
        };

        info!(
            settings = %settings.path().display(),
            interval = ?settings.get().update_interval,
            "clock screen starting"
        );

        let mut screen = ClockScreen {
            settings,
            refresh,
            face,
            background: None,
            transition: Transition::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            flyout: None,
            http,
            cache_path,
        };

        let cached = screen.load_cached();
        let first_check = screen.check_refresh(Utc::now());

        (screen, Task::batch([cached, first_check]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ClockTick => {
                self.recompose_face();
                Task::none()
            }
            Message::RefreshTick => self.check_refresh(Utc::now()),
            Message::TransitionFrame(now) => {
                match self.transition.advance(now) {
                    Step::Swap(image) => self.background = Some(image),
                    Step::Finished => debug!("background transition finished"),
                    Step::Continue => {}
                }
                Task::none()
            }
            Message::WindowResized(size) => {
                if size == self.window_size {
                    return Task::none();
                }

                debug!(width = size.width, height = size.height, "window resized");
                self.window_size = size;
                self.fetch_remote(Utc::now())
            }
            Message::BackgroundLoaded(ticket, Ok(image)) => {
                match self.refresh.finish_success(ticket) {
                    Completion::Apply => {
                        debug!(ticket = ticket.id, origin = ?image.origin, "showing background");
                        if ticket.source == FetchSource::Remote {
                            let changed_at = self.refresh.last_change();
                            self.settings.update(|s| s.last_background_change = changed_at);
                        }
                        self.transition.begin(image, Instant::now());
                    }
                    Completion::Superseded => {
                        debug!(ticket = ticket.id, "dropping superseded background");
                    }
                }
                Task::none()
            }
            Message::BackgroundLoaded(ticket, Err(e)) => {
                warn!(ticket = ticket.id, source = ?ticket.source, error = %e, "background load failed");
                let reset = self.settings.get().reset_loading_on_failure;
                self.refresh.finish_failure(ticket, reset);
                Task::none()
            }
            Message::OpenFlyout(flyout) => {
                self.flyout = Some(flyout);
                Task::none()
            }
            Message::CloseFlyout => {
                self.flyout = None;
                Task::none()
            }
            Message::ThemeSelected(theme) => {
                // A new theme shows a matching photo right away
                if self.settings.update(|s| s.theme = theme) {
                    return self.fetch_remote(Utc::now());
                }
                Task::none()
            }
            Message::IntervalSelected(interval) => {
                self.settings.update(|s| s.update_interval = interval);
                Task::none()
            }
            Message::LongTimeFormatToggled(enabled) => {
                self.settings.update(|s| s.long_time_format = enabled);
                self.recompose_face();
                Task::none()
            }
            Message::WorldTimeToggled(enabled) => {
                self.settings.update(|s| s.world_time = enabled);
                self.recompose_face();
                Task::none()
            }
            Message::ClockNameChanged(index, name) => {
                self.settings.update(|s| {
                    if let Some(clock) = s.clocks.get_mut(index) {
                        clock.name = name;
                    }
                });
                self.recompose_face();
                Task::none()
            }
            Message::ClockZoneSelected(index, zone) => {
                self.settings.update(|s| {
                    if let Some(clock) = s.clocks.get_mut(index) {
                        clock.time_zone = zone.name().to_string();
                    }
                });
                self.recompose_face();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let photo: Element<Message> = match &self.background {
            Some(background) => image(background.handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => Space::new(Length::Fill, Length::Fill).into(),
        };

        // Fading works by darkening the photo towards black
        let shade = Color::from_rgba(0.0, 0.0, 0.0, 1.0 - self.transition.opacity());
        let veil = container(Space::new(Length::Fill, Length::Fill)).style(move |_theme| container::Style {
            background: Some(Background::Color(shade)),
            ..container::Style::default()
        });

        let mut layers = stack![
            photo,
            veil,
            ui::clock_face::view(&self.face, self.refresh.is_loading()),
            ui::flyout::commands(),
        ];

        if let Some(flyout) = self.flyout {
            layers = layers.push(ui::flyout::view(flyout, self.settings.get()));
        }

        container(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Background::Color(Color::BLACK)),
                text_color: Some(Color::WHITE),
                ..container::Style::default()
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let clock_ticks = time::every(Duration::from_millis(100)).map(|_| Message::ClockTick);
        let refresh_ticks = time::every(Duration::from_secs(1)).map(|_| Message::RefreshTick);
        let resizes = window::resize_events().map(|(_id, size)| Message::WindowResized(size));

        let frames = if self.transition.is_animating() {
            time::every(Duration::from_millis(16)).map(Message::TransitionFrame)
        } else {
            Subscription::none()
        };

        Subscription::batch([clock_ticks, refresh_ticks, resizes, frames])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn recompose_face(&mut self) {
        self.face = ClockFace::compose(&Local::now(), self.settings.get());
    }

    /// Run the refresh policy for one tick
    fn check_refresh(&mut self, now: DateTime<Utc>) -> Task<Message> {
        let interval = self.settings.get().update_interval;

        match self.refresh.on_tick(now, interval) {
            RefreshDecision::NoOp => Task::none(),
            RefreshDecision::ForceFetch if self.refresh.is_loading() => {
                warn!("previous background load stalled, forcing a new one");
                self.fetch_remote(now)
            }
            decision => {
                debug!(?decision, ?interval, "background is due");
                self.fetch_remote(now)
            }
        }
    }

    /// Request a new photo for the current theme, interval and window size
    fn fetch_remote(&mut self, now: DateTime<Utc>) -> Task<Message> {
        let ticket = self.refresh.begin_fetch(now, FetchSource::Remote);
        let settings = self.settings.get();
        let url = uri::photo_url(
            &settings.photo_service_url,
            &settings.theme,
            settings.update_interval,
            self.window_size.width.round() as u32,
            self.window_size.height.round() as u32,
        );

        info!(ticket = ticket.id, %url, "fetching new background");

        Task::perform(
            fetch::download_image(self.http.clone(), url, self.cache_path.clone()),
            move |result| Message::BackgroundLoaded(ticket, result.map_err(Arc::new)),
        )
    }

    /// Show the last downloaded photo, if there is one
    fn load_cached(&mut self) -> Task<Message> {
        if !self.cache_path.exists() {
            return Task::none();
        }

        let ticket = self.refresh.begin_fetch(Utc::now(), FetchSource::Cache);
        Task::perform(fetch::load_cached(self.cache_path.clone()), move |result| {
            Message::BackgroundLoaded(ticket, result.map_err(Arc::new))
        })
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application("Unsplash Clock", ClockScreen::update, ClockScreen::view)
        .subscription(ClockScreen::subscription)
        .theme(ClockScreen::theme)
        .window_size(DEFAULT_WINDOW_SIZE)
        .centered()
        .run_with(ClockScreen::new)
}
