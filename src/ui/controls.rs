use iced::widget::{
    button, checkbox, column, container, pick_list, radio, row, text, text_input, Column,
};
use iced::{Element, Length};

use crate::state::report::KNOWN_INDEX_CODES;
use crate::state::session::{DateListing, Mode};
use crate::{Message, Satscope};

pub const ALL_REGIONS: &str = "All Regions";
pub const ALL_CATEGORIES: &str = "All Categories";
pub const ALL_COUNTRIES: &str = "All Countries";

/// Left pane: discovery filters, tile/date selection, index picks, and the
/// analyze trigger.
pub fn pane(app: &Satscope) -> Element<Message> {
    let mode_row = row![
        radio(
            "Real satellite data",
            Mode::Real,
            Some(app.session.mode()),
            Message::ModePicked,
        ),
        radio(
            "Synthetic data",
            Mode::Synthetic,
            Some(app.session.mode()),
            Message::ModePicked,
        ),
    ]
    .spacing(20);

    let search = text_input("Search tiles...", app.debouncer.text())
        .on_input(Message::SearchInput)
        .padding(8);

    let filters = row![
        pick_list(
            with_all_option(ALL_REGIONS, &app.options.regions),
            Some(picked_or_all(ALL_REGIONS, app.filter.region())),
            Message::RegionPicked,
        )
        .width(Length::Fill),
        pick_list(
            with_all_option(ALL_CATEGORIES, &app.options.categories),
            Some(picked_or_all(ALL_CATEGORIES, app.filter.category())),
            Message::CategoryPicked,
        )
        .width(Length::Fill),
        pick_list(
            with_all_option(ALL_COUNTRIES, &app.options.countries),
            Some(picked_or_all(ALL_COUNTRIES, app.filter.country())),
            Message::CountryPicked,
        )
        .width(Length::Fill),
    ]
    .spacing(10);

    let tile_picker = column![
        pick_list(
            app.session.tiles(),
            app.session.selected_tile().cloned(),
            Message::TilePicked,
        )
        .placeholder("No tiles found")
        .width(Length::Fill),
        text(format!("{} tiles", app.session.tile_count())).size(13),
    ]
    .spacing(4);

    let mut pane = column![
        text("Satscope").size(32),
        mode_row,
        search,
        filters,
        tile_picker,
    ]
    .spacing(16);

    if let Some(tile) = app.session.selected_tile() {
        pane = pane.push(
            container(
                column![
                    text(&tile.name).size(18),
                    text(&tile.description).size(13),
                    text(format!("📍 {}", tile.category)).size(13),
                    text(format!("🌍 {} ({})", tile.country, tile.region)).size(13),
                ]
                .spacing(4),
            )
            .padding(10),
        );
    }

    pane = match app.session.mode() {
        Mode::Real => pane.push(real_controls(app)),
        Mode::Synthetic => pane.push(synthetic_controls(app)),
    };

    let mut indices = Column::new().spacing(6).push(text("Spectral indices").size(16));
    for code in KNOWN_INDEX_CODES {
        indices = indices.push(
            checkbox(code, app.session.index_selected(code))
                .on_toggle(move |on| Message::IndexToggled(code, on)),
        );
    }
    pane = pane.push(indices);

    let analyzing = app.session.analysis_running();
    pane = pane.push(
        button(if analyzing { "Analyzing..." } else { "Analyze" })
            .on_press_maybe((!analyzing).then_some(Message::RunAnalysis))
            .padding(10),
    );

    if let Some(message) = &app.error {
        pane = pane.push(text(message).size(14).style(text::danger));
    }

    pane = pane.push(text(&app.status).size(13));

    container(pane.width(Length::Fixed(380.0)))
        .padding(20)
        .into()
}

/// Date selection for real acquisitions: a free-form date field plus the
/// products the backend reports as available for the selected tile.
fn real_controls(app: &Satscope) -> Element<Message> {
    let mut section = column![
        text("Acquisition date (YYYY-MM-DD)").size(16),
        text_input("2024-10-15", app.session.date())
            .on_input(Message::DateInput)
            .padding(8),
    ]
    .spacing(8);

    section = match app.session.date_listing() {
        DateListing::Idle => section,
        DateListing::Loading => section.push(text("Loading available dates...").size(13)),
        DateListing::Failed(message) => {
            section.push(text(format!("Error: {}", message)).size(13).style(text::danger))
        }
        DateListing::Loaded(products) if products.is_empty() => {
            section.push(text("No products found for this tile").size(13))
        }
        DateListing::Loaded(_) => {
            let mut dates = Column::new().spacing(4);
            for product in app.session.visible_dates() {
                dates = dates.push(
                    row![
                        button(text(&product.date).size(13))
                            .on_press(Message::DatePicked(product.date.clone()))
                            .padding(4),
                        text(format!(
                            "{:.1} MB {}",
                            product.size_mb,
                            if product.online { "✓ Online" } else { "⚠ Offline" }
                        ))
                        .size(13),
                    ]
                    .spacing(8),
                );
            }
            section.push(dates)
        }
    };

    section.into()
}

fn synthetic_controls(app: &Satscope) -> Element<Message> {
    column![
        text("Raster dimensions (64-4096)").size(16),
        row![
            text_input("Width", app.session.width_text())
                .on_input(Message::WidthInput)
                .padding(8),
            text_input("Height", app.session.height_text())
                .on_input(Message::HeightInput)
                .padding(8),
        ]
        .spacing(10),
    ]
    .spacing(8)
    .into()
}

fn with_all_option(all: &str, values: &[String]) -> Vec<String> {
    let mut options = Vec::with_capacity(values.len() + 1);
    options.push(all.to_string());
    options.extend(values.iter().cloned());
    options
}

fn picked_or_all(all: &str, picked: Option<&str>) -> String {
    picked.unwrap_or(all).to_string()
}
