use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context, Vec2};

use crate::config::LayoutConfig;
use crate::events::load_events;
use crate::layout::LayoutState;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<LayoutState, String>;

pub struct EpochRingsApp {
    events_path: PathBuf,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    layout: LayoutState,
    search: String,
    selected: Option<usize>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    show_sector_guides: bool,
    show_edges: bool,
    /// Offset from the pointer to the grabbed node's centre, in world units.
    drag_offset: Vec2,
    search_match_cache: Option<SearchMatchCache>,
    visible_node_count: usize,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

impl EpochRingsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, events_path: PathBuf, config: LayoutConfig) -> Self {
        let state = Self::start_load(events_path.clone(), config.clone());
        Self {
            events_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(events_path: PathBuf, config: LayoutConfig) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_events(&events_path)
                .and_then(|events| {
                    LayoutState::new(events, config).context("failed to build layout")
                })
                .map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::error!(%error, "failed to build layout");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(events_path: PathBuf, config: LayoutConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(events_path, config),
        }
    }
}

impl eframe::App for EpochRingsApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(layout) => AppState::Ready(Box::new(ViewModel::new(layout))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading events...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load events");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            self.events_path.clone(),
                            self.config.clone(),
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.events_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        self.events_path.clone(),
                        self.config.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(layout) => AppState::Ready(Box::new(ViewModel::new(layout))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
