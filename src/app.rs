use std::path::PathBuf;

use iced::widget::{Space, button, column, container, image, mouse_area, row, scrollable, text};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};

use crate::asset::{AssetKey, ResourceBundle, StringTable};
use crate::catalog::{Catalog, CatalogOrder};
use crate::config::Settings;
use crate::export;
use crate::view_model::{self, DetailViewModel, RowViewModel};

fn boot() -> (WorldFlags, Task<Message>) {
    let mut settings = Settings::load();
    if let Some(dir) = std::env::args().nth(1) {
        settings.resource_dir = Some(PathBuf::from(dir));
    }

    let mut state = WorldFlags::new(settings);
    let task = state.reload();
    (state, task)
}

pub fn run() -> iced::Result {
    iced::application(boot, update, view)
        .title("World Flags")
        .theme(theme)
        .subscription(subscription)
        .centered()
        .run()
}

struct WorldFlags {
    settings: Settings,
    names: StringTable,
    list_title: String,
    catalog: Catalog,
    rows: Vec<(RowViewModel, image::Handle)>,
    loading: bool,
    /// Bumped on every reload; list results tagged with an older value are dropped.
    load_generation: u64,
    detail: Option<Detail>,
    bars_hidden: bool,
    pending_share: Option<Vec<u8>>,
    status: Option<String>,
}

struct Detail {
    model: DetailViewModel,
    handle: image::Handle,
}

impl WorldFlags {
    fn new(settings: Settings) -> Self {
        let names = StringTable::load(&settings.resource_dir(), &settings.locale());
        let list_title = names.localized("Countries");
        Self {
            settings,
            names,
            list_title,
            catalog: Catalog::default(),
            rows: Vec::new(),
            loading: false,
            load_generation: 0,
            detail: None,
            bars_hidden: false,
            pending_share: None,
            status: None,
        }
    }

    fn bundle(&self) -> ResourceBundle {
        ResourceBundle::new(self.settings.resource_dir())
    }

    /// Rebuild the catalog and list rows for the current resource directory.
    fn reload(&mut self) -> Task<Message> {
        self.catalog = Catalog::default();
        self.rows.clear();
        self.detail = None;
        self.loading = true;
        self.status = None;
        self.load_generation += 1;

        let generation = self.load_generation;
        let bundle = self.bundle();
        let names = self.names.clone();
        let order = self.settings.order;
        let coefficient = self.settings.thumbnail_coefficient;
        Task::perform(
            load_list(bundle, names, order, coefficient),
            move |result| Message::ListLoaded(generation, result),
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenFolder,
    FolderSelected(Option<PathBuf>),
    ListLoaded(u64, Result<(Catalog, Vec<RowViewModel>), String>),
    ViewCountry(usize),
    DetailLoaded(Result<DetailViewModel, String>),
    BackToList,
    ToggleBars,
    Share,
    ShareDestination(Option<PathBuf>),
    Shared(Result<PathBuf, String>),
    KeyEscape,
}

fn subscription(_state: &WorldFlags) -> Subscription<Message> {
    iced::event::listen_with(|event, _status, _window| match event {
        iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { key, .. }) => {
            use iced::keyboard::Key;
            use iced::keyboard::key::Named;
            match key {
                Key::Named(Named::Escape) => Some(Message::KeyEscape),
                _ => None,
            }
        }
        _ => None,
    })
}

fn update(state: &mut WorldFlags, message: Message) -> Task<Message> {
    match message {
        Message::OpenFolder => {
            return Task::perform(pick_folder(), Message::FolderSelected);
        }
        Message::FolderSelected(Some(path)) => {
            state.settings.resource_dir = Some(path);
            state.settings.save();
            state.names =
                StringTable::load(&state.settings.resource_dir(), &state.settings.locale());
            state.list_title = state.names.localized("Countries");
            return state.reload();
        }
        Message::FolderSelected(None) => {}
        Message::ListLoaded(generation, _) if generation != state.load_generation => {
            log::debug!("Dropping stale list load {}", generation);
        }
        Message::ListLoaded(_, Ok((catalog, rows))) => {
            state.loading = false;
            state.catalog = catalog;
            state.rows = rows
                .into_iter()
                .map(|row| {
                    let t = &row.thumbnail;
                    let handle = image::Handle::from_rgba(t.width, t.height, t.rgba.clone());
                    (row, handle)
                })
                .collect();
        }
        Message::ListLoaded(_, Err(e)) => {
            log::error!("{}", e);
            state.loading = false;
            state.status = Some(e);
        }
        Message::ViewCountry(index) => {
            // Row selection is a plain index into the catalog
            let Some(key) = state.catalog.get(index).cloned() else {
                return Task::none();
            };
            if state.rows.get(index).is_some_and(|(row, _)| row.key != key) {
                log::warn!("Row {} does not match catalog entry {}", index, key);
                return Task::none();
            }
            let bundle = state.bundle();
            let names = state.names.clone();
            return Task::perform(load_detail(key, bundle, names), Message::DetailLoaded);
        }
        Message::DetailLoaded(Ok(model)) => {
            let rgba = model.image.to_rgba8();
            let (w, h) = rgba.dimensions();
            let handle = image::Handle::from_rgba(w, h, rgba.into_raw());
            state.detail = Some(Detail { model, handle });
            state.status = None;
        }
        Message::DetailLoaded(Err(e)) => {
            log::warn!("{}", e);
            state.status = Some(e);
        }
        Message::BackToList | Message::KeyEscape => {
            state.detail = None;
            state.bars_hidden = false;
            state.pending_share = None;
            state.status = None;
        }
        Message::ToggleBars => {
            if state.detail.is_some() {
                state.bars_hidden = !state.bars_hidden;
            }
        }
        Message::Share => {
            let displayed = state.detail.as_ref().map(|d| &d.model.image);
            match export::encode_for_sharing(displayed, state.settings.share_quality) {
                Ok(bytes) => {
                    state.pending_share = Some(bytes);
                    let file_name = state
                        .detail
                        .as_ref()
                        .map(|d| format!("{}.jpg", d.model.key))
                        .unwrap_or_else(|| "flag.jpg".into());
                    return Task::perform(
                        pick_share_destination(file_name),
                        Message::ShareDestination,
                    );
                }
                Err(e) => {
                    log::warn!("Share failed: {}", e);
                    state.status = Some(e.to_string());
                }
            }
        }
        Message::ShareDestination(Some(dest)) => {
            let Some(bytes) = state.pending_share.take() else {
                return Task::none();
            };
            return Task::perform(
                async move {
                    export::write_shared(&bytes, &dest)
                        .map(|()| dest)
                        .map_err(|e| e.to_string())
                },
                Message::Shared,
            );
        }
        Message::ShareDestination(None) => {
            state.pending_share = None;
        }
        Message::Shared(Ok(dest)) => {
            state.status = Some(format!("Saved to {}", dest.display()));
        }
        Message::Shared(Err(e)) => {
            log::warn!("Share failed: {}", e);
            state.status = Some(e);
        }
    }
    Task::none()
}

async fn load_list(
    bundle: ResourceBundle,
    names: StringTable,
    order: CatalogOrder,
    coefficient: f32,
) -> Result<(Catalog, Vec<RowViewModel>), String> {
    let catalog = Catalog::load(bundle.dir(), order).map_err(|e| e.to_string())?;
    let rows = view_model::render_list(&catalog, &names, &bundle, coefficient);
    Ok((catalog, rows))
}

async fn load_detail(
    key: AssetKey,
    bundle: ResourceBundle,
    names: StringTable,
) -> Result<DetailViewModel, String> {
    view_model::render_detail(&key, &names, &bundle).map_err(|e| e.to_string())
}

const LABEL_COLOR: Color = Color::from_rgb(0.5, 0.5, 0.55);
const FLAG_BORDER_WIDTH: f32 = 4.0;

fn view(state: &WorldFlags) -> Element<'_, Message> {
    if let Some(detail) = &state.detail {
        return detail_view(state, detail);
    }

    let mut toolbar_items: Vec<Element<'_, Message>> = vec![
        text(&state.list_title).size(28).into(),
        Space::new().width(Length::Fill).into(),
    ];
    if !state.rows.is_empty() {
        toolbar_items.push(
            text(format!("{} flags", state.rows.len()))
                .size(13)
                .color(LABEL_COLOR)
                .into(),
        );
    }
    toolbar_items.push(button("Open Folder").on_press(Message::OpenFolder).into());
    let toolbar = row(toolbar_items)
        .spacing(10)
        .padding(10)
        .align_y(Alignment::Center);

    let body: Element<'_, Message> = if state.loading {
        container(text("Loading...")).center(Length::Fill).into()
    } else if state.rows.is_empty() {
        let message = state.status.as_deref().unwrap_or("No flags found");
        container(text(message).color(LABEL_COLOR))
            .center(Length::Fill)
            .into()
    } else {
        scrollable(country_list(state)).height(Length::Fill).into()
    };

    let mut items: Vec<Element<'_, Message>> = vec![toolbar.into(), body];
    if let (false, Some(status)) = (state.rows.is_empty(), &state.status) {
        items.push(status_line(status));
    }
    column(items).into()
}

fn status_line(status: &str) -> Element<'_, Message> {
    container(text(status).size(12).color(LABEL_COLOR))
        .padding(8)
        .into()
}

fn country_list(state: &WorldFlags) -> Element<'_, Message> {
    let rows: Vec<Element<'_, Message>> = state
        .rows
        .iter()
        .map(|(vm, handle)| {
            button(
                row![image(handle.clone()), text(&vm.display_name).size(17)]
                    .spacing(16)
                    .align_y(Alignment::Center),
            )
            .on_press(Message::ViewCountry(vm.index))
            .style(button::text)
            .width(Length::Fill)
            .padding([6, 12])
            .into()
        })
        .collect();

    column(rows).spacing(2).padding(10).into()
}

fn detail_view<'a>(state: &'a WorldFlags, detail: &'a Detail) -> Element<'a, Message> {
    let flag = container(
        image(detail.handle.clone()).content_fit(iced::ContentFit::Contain),
    )
    .padding(FLAG_BORDER_WIDTH)
    .style(flag_border_style);

    let body = mouse_area(container(flag).center(Length::Fill)).on_press(Message::ToggleBars);

    let mut items: Vec<Element<'a, Message>> = Vec::new();
    if !state.bars_hidden {
        items.push(
            row![
                button("Back").on_press(Message::BackToList),
                Space::new().width(Length::Fill),
                text(&detail.model.title).size(17),
                Space::new().width(Length::Fill),
                button("Share").on_press(Message::Share),
            ]
            .spacing(10)
            .padding(10)
            .align_y(Alignment::Center)
            .into(),
        );
    }
    items.push(body.into());
    if let Some(status) = &state.status {
        items.push(status_line(status));
    }

    column(items).into()
}

fn flag_border_style(_theme: &Theme) -> container::Style {
    container::Style {
        border: iced::Border {
            color: Color::from_rgb(0.83, 0.83, 0.83),
            width: FLAG_BORDER_WIDTH,
            radius: 0.0.into(),
        },
        ..Default::default()
    }
}

fn theme(_state: &WorldFlags) -> Theme {
    Theme::Dark
}

async fn pick_folder() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select a flag folder")
        .pick_folder()
        .await
        .map(|handle| handle.path().to_path_buf())
}

async fn pick_share_destination(file_name: String) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Share flag")
        .set_file_name(file_name)
        .add_filter("JPEG image", &["jpg", "jpeg"])
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}
