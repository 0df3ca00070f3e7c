use std::{io::ErrorKind, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Offset, Utc};
use chrono_tz::Tz;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use office_heating_common::{
    ControlAction, ControlError, DayOfWeek, HeatingController, RuntimeConfig, ScheduleLimits,
    ScheduleSummary, ScheduleUpdate, SettingsUpdate, TimeSync, WeeklySchedule, TOPIC_CMD_OVERRIDE,
    TOPIC_CMD_SCHEDULE, TOPIC_CMD_SETTINGS, TOPIC_CMD_TIME_SYNC, TOPIC_NODE_SCHEDULE_STATE,
    TOPIC_NODE_STATE, TOPIC_SENSOR_TEMP,
};

#[derive(Clone)]
struct AppState {
    controller: Arc<Mutex<HeatingController>>,
    latest_reading: Arc<Mutex<Option<f32>>>,
    mqtt: AsyncClient,
    store: AppStore,
}

#[derive(Clone)]
struct AppStore {
    runtime_path: Arc<PathBuf>,
    schedule_path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct ScheduleView {
    schedule: Vec<f32>,
    #[serde(flatten)]
    summary: ScheduleSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideCommand {
    Toggle,
    On,
    Off,
    Auto,
}

const MAX_MQTT_PAYLOAD_BYTES: usize = 2048;
const SENSOR_RANGE_C: std::ops::RangeInclusive<f32> = -40.0..=85.0;

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = AppStore::new();
    let mut runtime = store.load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config from store: {err:#}");
        RuntimeConfig::default()
    });
    runtime.controller.sanitize();

    let schedule = match store.load_schedule(&runtime.controller.limits).await {
        Ok(Some(schedule)) => schedule,
        Ok(None) => WeeklySchedule::office_default(),
        Err(err) => {
            warn!("failed to load schedule from store: {err:#}");
            WeeklySchedule::office_default()
        }
    };

    let controller = HeatingController::with_schedule(runtime.controller.clone(), schedule);
    info!(
        "controller ready: {} schedule slots set, tick {}s, check every {} ticks",
        controller.schedule().set_count(),
        runtime.controller.node.tick_seconds,
        runtime.controller.node.check_interval_ticks
    );

    let mqtt_host = std::env::var("MQTT_HOST").unwrap_or(runtime.network.mqtt_host.clone());
    let mqtt_port = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(runtime.network.mqtt_port);

    let mut mqtt_options =
        MqttOptions::new(runtime.network.client_id.clone(), mqtt_host, mqtt_port);
    let mqtt_user = std::env::var("MQTT_USER").unwrap_or(runtime.network.mqtt_user.clone());
    let mqtt_pass = std::env::var("MQTT_PASS").unwrap_or(runtime.network.mqtt_pass.clone());
    if !mqtt_user.is_empty() {
        mqtt_options.set_credentials(mqtt_user, mqtt_pass);
    }

    let (mqtt, eventloop) = AsyncClient::new(mqtt_options, 64);

    let app_state = AppState {
        controller: Arc::new(Mutex::new(controller)),
        latest_reading: Arc::new(Mutex::new(None)),
        mqtt,
        store,
    };

    subscribe_topics(&app_state.mqtt).await?;
    spawn_mqtt_loop(app_state.clone(), eventloop);
    spawn_control_loop(
        app_state.clone(),
        Duration::from_secs(runtime.controller.node.tick_seconds),
        runtime.controller.node.default_history_c,
    );
    spawn_schedule_publish_loop(app_state.clone());

    if runtime.time_sync_interval_secs == 0 {
        info!("automatic time sync disabled");
    } else if runtime.timezone.parse::<Tz>().is_err() {
        warn!(
            "invalid timezone {:?}, automatic time sync disabled",
            runtime.timezone
        );
    } else {
        spawn_time_sync_loop(
            app_state.clone(),
            runtime.timezone.clone(),
            Duration::from_secs(runtime.time_sync_interval_secs),
        );
    }

    let app = Router::new()
        .route("/api/status", get(handle_get_status))
        .route(
            "/api/schedule",
            get(handle_get_schedule).put(handle_put_schedule),
        )
        .route(
            "/api/time-sync",
            get(handle_get_time_sync).put(handle_put_time_sync),
        )
        .route(
            "/api/settings",
            get(handle_get_settings).put(handle_put_settings),
        )
        .route("/api/override/toggle", post(handle_override_toggle))
        .route("/api/forecast", get(handle_get_forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let port = std::env::var("CONTROLLER_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind controller server at {addr}"))?;

    info!("controller listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn subscribe_topics(mqtt: &AsyncClient) -> anyhow::Result<()> {
    let topics = [
        TOPIC_SENSOR_TEMP,
        TOPIC_CMD_SCHEDULE,
        TOPIC_CMD_TIME_SYNC,
        TOPIC_CMD_SETTINGS,
        TOPIC_CMD_OVERRIDE,
    ];

    for topic in topics {
        mqtt.subscribe(topic, QoS::AtMostOnce)
            .await
            .with_context(|| format!("failed to subscribe to {topic}"))?;
    }
    Ok(())
}

fn spawn_mqtt_loop(app_state: AppState, mut eventloop: rumqttc::EventLoop) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    if let Err(err) =
                        handle_mqtt_message(&app_state, message.topic, message.payload.to_vec())
                            .await
                    {
                        warn!("mqtt message handling error: {err:#}");
                    }
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

fn spawn_control_loop(app_state: AppState, tick: Duration, default_reading: f32) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);

        loop {
            interval.tick().await;

            let reading = app_state
                .latest_reading
                .lock()
                .await
                .unwrap_or(default_reading);

            let outcome = {
                let mut controller = app_state.controller.lock().await;
                controller.on_tick(reading)
            };

            log_actions(&outcome.actions);

            let Some(report) = outcome.report else {
                debug!("clock not synced yet, report suppressed");
                continue;
            };
            match serde_json::to_vec(&report) {
                Ok(body) => {
                    if let Err(err) = app_state
                        .mqtt
                        .publish(TOPIC_NODE_STATE, QoS::AtLeastOnce, true, body)
                        .await
                    {
                        warn!("node state publish failed: {err}");
                    }
                }
                Err(err) => warn!("node state serialization failed: {err}"),
            }
        }
    });
}

fn spawn_schedule_publish_loop(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            publish_schedule_summary(&app_state).await;
        }
    });
}

fn spawn_time_sync_loop(app_state: AppState, timezone: String, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;

            let Some(now) = now_in_timezone(&timezone) else {
                warn!("timezone {timezone:?} no longer resolves, skipping time sync");
                continue;
            };
            let time = TimeSync::from_datetime(&now);

            let result = {
                let mut controller = app_state.controller.lock().await;
                controller.sync_clock(time)
            };
            match result {
                Ok(synced) => {
                    if synced.first_sync {
                        info!(
                            "initial clock sync: {} {:02}:{:02}",
                            DayOfWeek::from_index(time.day as usize).as_str(),
                            time.hour,
                            time.minute
                        );
                    } else {
                        debug!("clock synced to {time:?}");
                    }
                    log_actions(&synced.actions);
                }
                Err(err) => warn!("time sync rejected: {err}"),
            }
        }
    });
}

async fn publish_schedule_summary(app_state: &AppState) {
    let summary = {
        let controller = app_state.controller.lock().await;
        controller.schedule_summary()
    };
    match serde_json::to_vec(&summary) {
        Ok(body) => {
            if let Err(err) = app_state
                .mqtt
                .publish(TOPIC_NODE_SCHEDULE_STATE, QoS::AtLeastOnce, true, body)
                .await
            {
                warn!("schedule state publish failed: {err}");
            }
        }
        Err(err) => warn!("schedule serialization failed: {err}"),
    }
}

fn log_actions(actions: &[ControlAction]) {
    for action in actions {
        info!("controller action: {action:?}");
    }
}

async fn handle_mqtt_message(
    app_state: &AppState,
    topic: String,
    payload: Vec<u8>,
) -> anyhow::Result<()> {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return Ok(());
    }

    let message = String::from_utf8(payload).context("non utf8 mqtt payload")?;

    match topic.as_str() {
        TOPIC_SENSOR_TEMP => match parse_reading(&message) {
            Some(celsius) => *app_state.latest_reading.lock().await = Some(celsius),
            None => warn!("ignoring sensor reading {message:?}"),
        },
        TOPIC_CMD_SCHEDULE => {
            let update: ScheduleUpdate =
                serde_json::from_str(&message).context("invalid schedule payload")?;
            match apply_schedule(app_state, &update.schedule).await? {
                Ok(summary) => info!("schedule replaced over mqtt: {summary:?}"),
                Err(err) => warn!("schedule rejected: {err}"),
            }
        }
        TOPIC_CMD_TIME_SYNC => {
            let time: TimeSync =
                serde_json::from_str(&message).context("invalid time-sync payload")?;
            let result = app_state.controller.lock().await.sync_clock(time);
            match result {
                Ok(synced) => log_actions(&synced.actions),
                Err(err) => warn!("time sync rejected: {err}"),
            }
        }
        TOPIC_CMD_SETTINGS => {
            let update: SettingsUpdate =
                serde_json::from_str(&message).context("invalid settings payload")?;
            let actions = app_state.controller.lock().await.apply_settings(update);
            log_actions(&actions);
        }
        TOPIC_CMD_OVERRIDE => {
            let Some(command) = parse_override_command(&message) else {
                warn!("unknown override command {message:?}");
                return Ok(());
            };
            let actions = {
                let mut controller = app_state.controller.lock().await;
                match command {
                    OverrideCommand::Toggle => controller.toggle_override(),
                    OverrideCommand::On | OverrideCommand::Off => {
                        controller.apply_settings(SettingsUpdate {
                            manual_override: Some(1),
                            heating_status: Some(i64::from(command == OverrideCommand::On)),
                            ..SettingsUpdate::default()
                        })
                    }
                    OverrideCommand::Auto => controller.apply_settings(SettingsUpdate {
                        manual_override: Some(0),
                        ..SettingsUpdate::default()
                    }),
                }
            };
            log_actions(&actions);
        }
        _ => {}
    }
    Ok(())
}

/// Replaces and persists the schedule. The outer error is a storage failure,
/// the inner one a rejected schedule.
async fn apply_schedule(
    app_state: &AppState,
    values: &[i32],
) -> anyhow::Result<Result<ScheduleSummary, ControlError>> {
    let (result, schedule) = {
        let mut controller = app_state.controller.lock().await;
        let result = controller.replace_schedule(values);
        (result, controller.schedule().clone())
    };

    let replaced = match result {
        Ok(replaced) => replaced,
        Err(err) => return Ok(Err(err)),
    };
    log_actions(&replaced.actions);
    app_state.store.save_schedule(&schedule).await?;
    publish_schedule_summary(app_state).await;
    Ok(Ok(replaced.summary))
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.lock().await.status();
    Json(status)
}

async fn handle_get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let controller = state.controller.lock().await;
    Json(ScheduleView {
        schedule: controller.schedule().slots().to_vec(),
        summary: controller.schedule_summary(),
    })
}

async fn handle_put_schedule(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleUpdate>, JsonRejection>,
) -> axum::response::Response {
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    match apply_schedule(&state, &update.schedule).await {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(err)) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        Err(err) => {
            warn!("failed to persist schedule update: {err:#}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist schedule",
            )
        }
    }
}

async fn handle_get_time_sync(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.lock().await.time_sync_status();
    Json(status)
}

async fn handle_put_time_sync(
    State(state): State<AppState>,
    payload: Result<Json<TimeSync>, JsonRejection>,
) -> axum::response::Response {
    let Json(time) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let mut controller = state.controller.lock().await;
    match controller.sync_clock(time) {
        Ok(synced) => {
            if synced.first_sync {
                info!(
                    "initial clock sync over http: day {} {:02}:{:02}",
                    time.day, time.hour, time.minute
                );
            }
            log_actions(&synced.actions);
            Json(controller.time_sync_status()).into_response()
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn handle_get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.controller.lock().await.settings();
    Json(settings)
}

async fn handle_put_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> axum::response::Response {
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    if update.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No settings provided");
    }

    let (actions, settings) = {
        let mut controller = state.controller.lock().await;
        let actions = controller.apply_settings(update);
        (actions, controller.settings())
    };
    log_actions(&actions);
    Json(settings).into_response()
}

async fn handle_override_toggle(State(state): State<AppState>) -> impl IntoResponse {
    let (actions, settings) = {
        let mut controller = state.controller.lock().await;
        let actions = controller.toggle_override();
        (actions, controller.settings())
    };
    log_actions(&actions);
    Json(settings)
}

async fn handle_get_forecast(State(state): State<AppState>) -> impl IntoResponse {
    let forecast = state.controller.lock().await.forecast();
    Json(forecast)
}

impl AppStore {
    fn new() -> Self {
        let data_dir = std::env::var("HEATING_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.office-heating"));

        Self {
            runtime_path: Arc::new(data_dir.join("runtime.json")),
            schedule_path: Arc::new(data_dir.join("schedule.json")),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.runtime_path.as_ref()).await {
            Ok(raw) => Ok(serde_json::from_slice::<RuntimeConfig>(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_schedule(
        &self,
        limits: &ScheduleLimits,
    ) -> anyhow::Result<Option<WeeklySchedule>> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.schedule_path.as_ref()).await {
            Ok(raw) => decode_schedule(&raw, limits).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_schedule(&self, schedule: &WeeklySchedule) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.schedule_path.as_ref().clone();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload = serde_json::to_vec_pretty(schedule)?;
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

fn decode_schedule(raw: &[u8], limits: &ScheduleLimits) -> anyhow::Result<WeeklySchedule> {
    let slots: Vec<f32> =
        serde_json::from_slice(raw).context("schedule file is not a number array")?;
    Ok(WeeklySchedule::from_slots(slots, limits)?)
}

fn parse_reading(message: &str) -> Option<f32> {
    let celsius = message.trim().parse::<f32>().ok()?;
    (celsius.is_finite() && SENSOR_RANGE_C.contains(&celsius)).then_some(celsius)
}

fn parse_override_command(message: &str) -> Option<OverrideCommand> {
    match message.trim().to_ascii_lowercase().as_str() {
        "toggle" => Some(OverrideCommand::Toggle),
        "on" => Some(OverrideCommand::On),
        "off" => Some(OverrideCommand::Off),
        "auto" => Some(OverrideCommand::Auto),
        _ => None,
    }
}

fn now_in_timezone(timezone: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let tz: Tz = timezone.parse().ok()?;
    let local = Utc::now().with_timezone(&tz);
    Some(local.with_timezone(&local.offset().fix()))
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
