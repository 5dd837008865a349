use iced::widget::{column, container, image, row, scrollable, text, Column};
use iced::{Element, Length};

use crate::state::report::SceneReport;
use crate::{Message, Satscope};

/// Right pane: scene metadata and one card per computed index.
pub fn pane(app: &Satscope) -> Element<Message> {
    let content: Element<Message> = match &app.report {
        Some(report) => column![metadata(report), index_cards(app, report)]
            .spacing(20)
            .into(),
        None => text("Run an analysis to see results here.").size(14).into(),
    };

    container(scrollable(content).width(Length::Fill))
        .padding(20)
        .width(Length::Fill)
        .into()
}

fn metadata(report: &SceneReport) -> Element<'_, Message> {
    let mut card = column![
        text("Scene Information").size(20),
        detail_row("Tile ID:", report.tile_id.clone()),
    ]
    .spacing(6);

    if let Some(date) = &report.date {
        card = card.push(detail_row("Date:", date.clone()));
    }

    card = card
        .push(detail_row(
            "Dimensions:",
            format!("{} × {} pixels", report.width, report.height),
        ))
        .push(detail_row("Total Pixels:", report.pixel_count_display()))
        .push(detail_row(
            "Indices Computed:",
            report.index_count().to_string(),
        ));

    container(card).padding(12).into()
}

fn index_cards<'a>(app: &'a Satscope, report: &'a SceneReport) -> Element<'a, Message> {
    let mut cards = Column::new().spacing(16);

    for summary in &report.summaries {
        let mut card = column![text(summary.full_name()).size(18)].spacing(8);

        card = match app.previews.get(&summary.code) {
            Some(handle) => card.push(image(handle.clone()).width(Length::Fill)),
            None => card.push(text("Rendering preview...").size(13)),
        };

        card = card.push(
            column![
                detail_row("Range:", summary.range_display()),
                detail_row("Mean:", summary.mean_display()),
                detail_row("Std Dev:", summary.std_dev_display()),
            ]
            .spacing(2),
        );

        cards = cards.push(container(card).padding(12));
    }

    cards.into()
}

fn detail_row(label: &'static str, value: String) -> Element<'static, Message> {
    row![text(label).size(14), text(value).size(14)]
        .spacing(8)
        .into()
}
