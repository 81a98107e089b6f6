use iced::widget::{column, container, row, text, Column};
use iced::{Alignment, Element, Length};

use crate::clock::ClockFace;
use crate::Message;

/// Large time and date centred over the background, world clocks below
pub fn view(face: &ClockFace, loading: bool) -> Element<'_, Message> {
    let world = row(face.world.iter().map(|reading| {
        column![
            text(&reading.name).size(18),
            text(&reading.time).size(36),
        ]
        .spacing(4)
        .align_x(Alignment::Center)
        .into()
    }))
    .spacing(48);

    let mut content: Column<Message> = column![
        text(&face.time).size(120),
        text(&face.date).size(32),
        world,
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    // Stand-in for a progress ring while a photo downloads
    if loading {
        content = content.push(text("Loading photo…").size(14));
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
