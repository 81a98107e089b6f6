//! Settings panels
//!
//! Two panels edit the persisted settings: "Settings" for the photo
//! theme, refresh interval and time format, and "World Clock" for the
//! three extra zones. Only one is open at a time.

use iced::widget::{button, checkbox, column, container, horizontal_space, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::clock;
use crate::state::data::{IntervalClass, THEMES};
use crate::state::settings::Settings;
use crate::Message;

/// Width of an open panel
const PANEL_WIDTH: f32 = 380.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flyout {
    ClockSettings,
    WorldClock,
}

impl Flyout {
    pub const ALL: [Flyout; 2] = [Self::ClockSettings, Self::WorldClock];

    pub fn title(self) -> &'static str {
        match self {
            Self::ClockSettings => "Settings",
            Self::WorldClock => "World Clock",
        }
    }
}

/// Buttons that open the panels, shown in the top-right corner
pub fn commands<'a>() -> Element<'a, Message> {
    let buttons = row(Flyout::ALL.into_iter().map(|flyout| {
        button(text(flyout.title()).size(14))
            .on_press(Message::OpenFlyout(flyout))
            .padding([6, 12])
            .into()
    }))
    .spacing(8);

    container(row![horizontal_space(), buttons])
        .width(Length::Fill)
        .padding(16)
        .into()
}

/// The open panel, docked to the right edge
pub fn view(flyout: Flyout, settings: &Settings) -> Element<'_, Message> {
    let body = match flyout {
        Flyout::ClockSettings => clock_settings(settings),
        Flyout::WorldClock => world_clock(settings),
    };

    let header = row![
        text(flyout.title()).size(24),
        horizontal_space(),
        button(text("Close").size(14)).on_press(Message::CloseFlyout),
    ]
    .align_y(Alignment::Center);

    let panel = container(column![header, body].spacing(20))
        .width(PANEL_WIDTH)
        .height(Length::Fill)
        .padding(24)
        .style(container::rounded_box);

    row![horizontal_space(), panel].into()
}

fn clock_settings(settings: &Settings) -> Element<'_, Message> {
    let themes: Vec<String> = THEMES.iter().map(|theme| theme.to_string()).collect();

    column![
        text("Photo theme").size(14),
        pick_list(themes, Some(settings.theme.clone()), Message::ThemeSelected)
            .width(Length::Fill),
        text("Change photo").size(14),
        pick_list(
            IntervalClass::ALL,
            Some(settings.update_interval),
            Message::IntervalSelected,
        )
        .width(Length::Fill),
        checkbox("24-hour clock", settings.long_time_format)
            .on_toggle(Message::LongTimeFormatToggled),
    ]
    .spacing(10)
    .into()
}

fn world_clock(settings: &Settings) -> Element<'_, Message> {
    let clocks = settings.clocks.iter().enumerate().map(|(index, world_clock)| {
        column![
            text(format!("Clock {}", index + 1)).size(14),
            text_input("Name", &world_clock.name)
                .on_input(move |name| Message::ClockNameChanged(index, name)),
            pick_list(
                &chrono_tz::TZ_VARIANTS[..],
                Some(clock::zone(&world_clock.time_zone)),
                move |zone| Message::ClockZoneSelected(index, zone),
            )
            .width(Length::Fill),
        ]
        .spacing(6)
        .into()
    });

    column![
        checkbox("Show world clocks", settings.world_time)
            .on_toggle(Message::WorldTimeToggled),
        column(clocks).spacing(16),
    ]
    .spacing(16)
    .into()
}
