//! Application state management
//!
//! This module contains the main application state, handling keyboard input,
//! data loading, and state transitions between the route list, stop list,
//! schedule, statistics and favorites views.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::{ApiClient, DayType, Direction, IntervalStats, Route, Stop, TripDurations};
use crate::cli::StartupConfig;
use crate::departures::{spawn_batch, DepartureStatus, DepartureUpdate};
use crate::favorites::{FavoriteEntry, FavoriteKey, Favorites};
use crate::schedule::{next_departure, NextDeparture};
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::theme::Theme;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching the route list
    Loading,
    /// List of all routes
    RouteList,
    /// Stops of the selected route with next-departure countdowns
    StopList,
    /// Departure times for the selected stop
    ScheduleView,
    /// Interval and trip-duration statistics for the selected stop
    StatsView,
    /// Saved favorites
    FavoritesView,
}

/// Asynchronous work requested by key handling, executed by the main loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    LoadRoutes,
    OpenRoute(String),
    OpenStop(String),
    /// Jump into a stop favorite: route, stop, direction, day type
    OpenFavoriteStop(String, String, Direction, DayType),
    LoadStats,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Dismissible warning line (stale data, failed fetches)
    pub warning: Option<String>,
    /// Active color theme
    pub theme: Theme,

    /// All known routes
    pub routes: Vec<Route>,
    /// Index of the selected route in the list view
    pub route_index: usize,
    /// Route currently opened (stop list / schedule / stats)
    pub current_route: Option<Route>,
    /// Selected travel direction
    pub direction: Direction,
    /// Selected schedule variant
    pub day_type: DayType,

    /// Stops of the current route, in travel order
    pub stops: Vec<Stop>,
    /// Index of the selected stop in the stop list
    pub stop_index: usize,
    /// Per-stop departure results as batch chunks land
    pub departures: HashMap<String, DepartureStatus>,

    /// Stop currently opened in the schedule view
    pub current_stop: Option<String>,
    /// Departure times for the current stop
    pub schedule_times: Vec<String>,
    /// Next departure derived from the schedule
    pub next: Option<NextDeparture>,
    /// Scroll offset in the schedule view
    pub schedule_scroll: u16,

    /// Headway statistics for the stats view
    pub intervals: IntervalStats,
    /// Trip duration statistics for the stats view
    pub durations: TripDurations,

    /// Index of the selected entry in the favorites view
    pub favorite_index: usize,
    /// Whether the backend answered the liveness probe
    pub backend_awake: Option<bool>,
    /// Timestamp of the last completed load
    pub last_refresh: Option<DateTime<Local>>,

    /// Favorites registry
    pub favorites: Favorites,
    /// Selection generation; departure updates from older batches are dropped
    generation: u64,
    /// Asynchronous work queued by key handling
    pending: Option<PendingAction>,
    /// Route requested via --route
    pending_route: Option<String>,
    /// Whether to land in the favorites view after the initial load
    pending_favorites: bool,

    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    departure_tx: mpsc::UnboundedSender<DepartureUpdate>,
    departure_rx: mpsc::UnboundedReceiver<DepartureUpdate>,
}

impl App {
    /// Creates a new App instance from CLI startup configuration.
    pub fn new(config: StartupConfig) -> Self {
        // Persistence is best-effort: without a usable home directory the
        // app runs with session-only state
        let store: Arc<dyn KeyValueStore> = match FileStore::new() {
            Some(file_store) => Arc::new(file_store),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Creates a new App over an explicit store (tests use MemoryStore).
    pub fn with_store(config: StartupConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let mut api = match &config.api_url {
            Some(url) => ApiClient::with_base_url(store.clone(), url.clone()),
            None => ApiClient::new(store.clone()),
        };
        if !config.use_cache {
            api = api.without_cache();
        }

        let (departure_tx, departure_rx) = mpsc::unbounded_channel();
        let day_type = DayType::for_weekday(chrono::Datelike::weekday(&Local::now()));

        Self {
            state: AppState::Loading,
            should_quit: false,
            show_help: false,
            warning: None,
            theme: Theme::load(store.as_ref()),
            routes: Vec::new(),
            route_index: 0,
            current_route: None,
            direction: Direction::Outbound,
            day_type,
            stops: Vec::new(),
            stop_index: 0,
            departures: HashMap::new(),
            current_stop: None,
            schedule_times: Vec::new(),
            next: None,
            schedule_scroll: 0,
            intervals: IntervalStats::default(),
            durations: TripDurations::default(),
            favorite_index: 0,
            backend_awake: None,
            last_refresh: None,
            favorites: Favorites::new(store.clone()),
            generation: 0,
            pending: Some(PendingAction::LoadRoutes),
            pending_route: config.initial_route,
            pending_favorites: config.start_in_favorites,
            api,
            store,
            departure_tx,
            departure_rx,
        }
    }

    /// Takes the queued asynchronous action, if any.
    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Executes a pending action. Called by the main loop between renders.
    pub async fn run_pending(&mut self, action: PendingAction) {
        match action {
            PendingAction::LoadRoutes => self.load_routes().await,
            PendingAction::OpenRoute(route) => self.open_route(&route).await,
            PendingAction::OpenStop(stop) => self.open_stop(&stop).await,
            PendingAction::OpenFavoriteStop(route, stop, direction, day_type) => {
                self.direction = direction;
                self.day_type = day_type;
                self.open_route(&route).await;
                if self.current_route.is_some() {
                    self.open_stop(&stop).await;
                }
            }
            PendingAction::LoadStats => self.load_stats().await,
        }
    }

    /// Fetches the route list and enters the startup view.
    async fn load_routes(&mut self) {
        self.backend_awake = Some(self.api.health().await);

        match self.api.routes().await {
            Ok(fetched) => {
                self.routes = fetched.data;
                if fetched.warning.is_some() {
                    self.warning = Some("Backend unreachable - showing cached routes".to_string());
                }
            }
            Err(error) => {
                self.warning = Some(format!("Failed to load routes: {}", error));
            }
        }
        self.last_refresh = Some(Local::now());
        self.route_index = 0;
        self.state = AppState::RouteList;

        if self.pending_favorites {
            self.pending_favorites = false;
            self.state = AppState::FavoritesView;
        } else if let Some(route) = self.pending_route.take() {
            self.pending = Some(PendingAction::OpenRoute(route));
        }
    }

    /// Fetches stops for a route and launches the departure batch.
    async fn open_route(&mut self, route_name: &str) {
        let route = self
            .routes
            .iter()
            .find(|r| r.route_short_name == route_name)
            .cloned()
            .unwrap_or_else(|| Route {
                route_id: String::new(),
                route_short_name: route_name.to_string(),
                route_long_name: String::new(),
            });

        match self.api.stops(&route.route_short_name, self.direction).await {
            Ok(fetched) => {
                self.stops = fetched.data;
                if fetched.warning.is_some() {
                    self.warning = Some("Backend unreachable - showing cached stops".to_string());
                }
                self.current_route = Some(route);
                self.stop_index = 0;
                self.state = AppState::StopList;
                self.restart_departure_batch();
            }
            Err(error) => {
                self.warning = Some(format!("Failed to load stops: {}", error));
                self.state = AppState::RouteList;
            }
        }
        self.last_refresh = Some(Local::now());
    }

    /// Invalidates any running batch and spawns a new one for the current
    /// route, direction and day type.
    fn restart_departure_batch(&mut self) {
        self.generation += 1;
        self.departures.clear();

        let Some(route) = &self.current_route else {
            return;
        };
        let stop_names: Vec<String> = self.stops.iter().map(|s| s.stop_name.clone()).collect();
        spawn_batch(
            self.api.clone(),
            route.route_short_name.clone(),
            self.direction,
            self.day_type,
            stop_names,
            self.generation,
            self.departure_tx.clone(),
        );
    }

    /// Applies departure updates that arrived since the last tick.
    ///
    /// Updates from superseded batches (older generation) are dropped, so a
    /// stale batch can never overwrite the current selection's data.
    pub fn drain_departure_updates(&mut self) {
        while let Ok(update) = self.departure_rx.try_recv() {
            if update.generation == self.generation {
                self.departures.insert(update.stop_name, update.status);
            }
        }
    }

    /// Fetches the schedule for a stop and derives the next departure.
    async fn open_stop(&mut self, stop_name: &str) {
        let Some(route) = self.current_route.clone() else {
            return;
        };

        match self
            .api
            .schedule(
                &route.route_short_name,
                stop_name,
                self.direction,
                self.day_type,
            )
            .await
        {
            Ok(fetched) => {
                self.schedule_times = fetched.data;
                self.next = next_departure(&self.schedule_times, Local::now().time());
                if fetched.warning.is_some() {
                    self.warning =
                        Some("Backend unreachable - showing cached schedule".to_string());
                }
                self.current_stop = Some(stop_name.to_string());
                self.schedule_scroll = 0;
                self.state = AppState::ScheduleView;
            }
            Err(error) => {
                self.warning = Some(format!("Failed to load schedule: {}", error));
            }
        }
        self.last_refresh = Some(Local::now());
    }

    /// Fetches interval and duration statistics for the current selection.
    async fn load_stats(&mut self) {
        let Some(route) = self.current_route.clone() else {
            return;
        };
        let Some(stop) = self.current_stop.clone().or_else(|| {
            self.stops
                .get(self.stop_index)
                .map(|s| s.stop_name.clone())
        }) else {
            return;
        };

        let (intervals, durations) = tokio::join!(
            self.api
                .intervals(&route.route_short_name, &stop, self.direction, self.day_type),
            self.api
                .durations(&route.route_short_name, self.direction, self.day_type),
        );

        let mut degraded = false;
        match intervals {
            Ok(fetched) => {
                degraded |= fetched.warning.is_some();
                self.intervals = fetched.data;
            }
            Err(_) => self.intervals = IntervalStats::default(),
        }
        match durations {
            Ok(fetched) => {
                degraded |= fetched.warning.is_some();
                self.durations = fetched.data;
            }
            Err(_) => self.durations = TripDurations::default(),
        }
        if degraded {
            self.warning = Some("Backend unreachable - showing cached statistics".to_string());
        }

        self.current_stop = Some(stop);
        self.state = AppState::StatsView;
        self.last_refresh = Some(Local::now());
    }

    /// Returns the currently selected route in the list view, if any.
    pub fn selected_route(&self) -> Option<&Route> {
        self.routes.get(self.route_index)
    }

    /// Returns the currently selected stop in the stop list, if any.
    pub fn selected_stop(&self) -> Option<&Stop> {
        self.stops.get(self.stop_index)
    }

    /// Saved favorites, newest first.
    pub fn favorite_entries(&self) -> Vec<FavoriteEntry> {
        self.favorites.list()
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (Esc also quits from the route list)
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Enter`: Open selected route / stop / favorite
    /// - `Esc`: Dismiss warning, else go back one view
    /// - `d`: Toggle direction, `w`: toggle weekday/weekend
    /// - `f`: Toggle favorite for the selected route or stop
    /// - `s`: Statistics view, `x`: favorites view, `t`: cycle theme
    /// - `r`: Refresh current view, `c`: clear response cache
    /// - `?`: Help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Esc dismisses a warning before acting as navigation
        if key_event.code == KeyCode::Esc && self.warning.is_some() {
            self.warning = None;
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::RouteList => self.handle_route_list_key(key_event),
            AppState::StopList => self.handle_stop_list_key(key_event),
            AppState::ScheduleView => self.handle_schedule_key(key_event),
            AppState::StatsView => self.handle_stats_key(key_event),
            AppState::FavoritesView => self.handle_favorites_key(key_event),
        }
    }

    fn handle_route_list_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.route_index = self.route_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.route_index + 1 < self.routes.len() {
                    self.route_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(route) = self.selected_route() {
                    self.pending = Some(PendingAction::OpenRoute(route.route_short_name.clone()));
                }
            }
            KeyCode::Char('f') => self.toggle_route_favorite(),
            KeyCode::Char('x') => {
                self.favorite_index = 0;
                self.state = AppState::FavoritesView;
            }
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('r') => {
                self.state = AppState::Loading;
                self.pending = Some(PendingAction::LoadRoutes);
            }
            KeyCode::Char('c') => self.clear_cache(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_stop_list_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.state = AppState::RouteList;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.stop_index = self.stop_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.stop_index + 1 < self.stops.len() {
                    self.stop_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(stop) = self.selected_stop() {
                    self.pending = Some(PendingAction::OpenStop(stop.stop_name.clone()));
                }
            }
            KeyCode::Char('d') => {
                self.direction = self.direction.toggle();
                self.reload_current_route();
            }
            KeyCode::Char('w') => {
                self.day_type = self.day_type.toggle();
                // Stop order is unchanged; only departures depend on day type
                self.restart_departure_batch();
            }
            KeyCode::Char('f') => self.toggle_stop_favorite(),
            KeyCode::Char('s') => self.pending = Some(PendingAction::LoadStats),
            KeyCode::Char('r') => self.reload_current_route(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_schedule_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.state = AppState::StopList;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.schedule_scroll = self.schedule_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.schedule_scroll = self.schedule_scroll.saturating_add(1);
            }
            KeyCode::Char('g') => self.schedule_scroll = 0,
            KeyCode::Char('d') => {
                self.direction = self.direction.toggle();
                self.reload_current_stop();
            }
            KeyCode::Char('w') => {
                self.day_type = self.day_type.toggle();
                self.reload_current_stop();
            }
            KeyCode::Char('f') => self.toggle_stop_favorite(),
            KeyCode::Char('s') => self.pending = Some(PendingAction::LoadStats),
            KeyCode::Char('r') => self.reload_current_stop(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.state = AppState::StopList;
            }
            KeyCode::Char('d') => {
                self.direction = self.direction.toggle();
                self.pending = Some(PendingAction::LoadStats);
            }
            KeyCode::Char('w') => {
                self.day_type = self.day_type.toggle();
                self.pending = Some(PendingAction::LoadStats);
            }
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_favorites_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('x') => {
                self.state = AppState::RouteList;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.favorite_index = self.favorite_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.favorite_index + 1 < self.favorite_entries().len() {
                    self.favorite_index += 1;
                }
            }
            KeyCode::Enter => {
                let entries = self.favorite_entries();
                if let Some(entry) = entries.get(self.favorite_index) {
                    self.pending = Some(match entry {
                        FavoriteEntry::Route { route_name, .. } => {
                            PendingAction::OpenRoute(route_name.clone())
                        }
                        FavoriteEntry::Stop {
                            route_name,
                            stop_name,
                            direction,
                            day_type,
                            ..
                        } => PendingAction::OpenFavoriteStop(
                            route_name.clone(),
                            stop_name.clone(),
                            *direction,
                            *day_type,
                        ),
                    });
                }
            }
            KeyCode::Char('f') | KeyCode::Backspace => {
                let entries = self.favorite_entries();
                if let Some(entry) = entries.get(self.favorite_index) {
                    self.favorites.remove(&entry.key());
                    if self.favorite_index > 0 {
                        self.favorite_index -= 1;
                    }
                }
            }
            KeyCode::Char('X') => {
                self.favorites.clear();
                self.favorite_index = 0;
            }
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn reload_current_route(&mut self) {
        if let Some(route) = &self.current_route {
            self.pending = Some(PendingAction::OpenRoute(route.route_short_name.clone()));
        }
    }

    fn reload_current_stop(&mut self) {
        if let Some(stop) = &self.current_stop {
            self.pending = Some(PendingAction::OpenStop(stop.clone()));
        }
    }

    fn toggle_route_favorite(&mut self) {
        let Some(route) = self.selected_route().cloned() else {
            return;
        };
        let key = FavoriteKey::Route {
            route: route.route_short_name.clone(),
        };
        if self.favorites.is_favorite_route(&route.route_short_name) {
            self.favorites.remove(&key);
        } else {
            self.favorites
                .add_route(&route.route_short_name, &route.route_long_name);
        }
    }

    fn toggle_stop_favorite(&mut self) {
        let Some(route) = self.current_route.clone() else {
            return;
        };
        let stop_name = match self.state {
            AppState::ScheduleView => self.current_stop.clone(),
            _ => self.selected_stop().map(|s| s.stop_name.clone()),
        };
        let Some(stop_name) = stop_name else {
            return;
        };

        if self.favorites.is_favorite(
            &route.route_short_name,
            &stop_name,
            self.direction,
            self.day_type,
        ) {
            self.favorites.remove(&FavoriteKey::Stop {
                route: route.route_short_name.clone(),
                stop: stop_name,
                direction: self.direction,
                day_type: self.day_type,
            });
        } else {
            self.favorites.add_stop(
                &route.route_short_name,
                &route.route_long_name,
                &stop_name,
                self.direction,
                self.day_type,
            );
        }
    }

    fn cycle_theme(&mut self) {
        self.theme = self.theme.cycle();
        self.theme.save(self.store.as_ref());
    }

    fn clear_cache(&mut self) {
        let bytes = self.api.cache().size();
        self.api.cache().clear();
        self.warning = Some(format!("Cache cleared ({} KB)", bytes / 1024));
    }
}
