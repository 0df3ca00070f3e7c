use std::{sync::Arc, time::Duration};

use anyhow::Context;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use office_heating_common::{TOPIC_NODE_STATE, TOPIC_SENSOR_STATUS, TOPIC_SENSOR_TEMP};

use crate::room::{is_office_hours, RoomModel};

/// The parts of the node report the room simulation reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
struct NodeView {
    #[serde(rename = "heatingOn")]
    heating_on: bool,
    day: u8,
    hour: u8,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mqtt_host = std::env::var("MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mqtt_port = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(1883);
    let tick_seconds = std::env::var("SENSOR_TICK_SECONDS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|seconds| *seconds > 0)
        .unwrap_or(15);
    let initial_c = std::env::var("SENSOR_INITIAL_C")
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .filter(|celsius| celsius.is_finite())
        .unwrap_or(20.0);

    let mut mqtt_options = MqttOptions::new("office-heating-sensor", mqtt_host, mqtt_port);

    if let Ok(user) = std::env::var("MQTT_USER") {
        let pass = std::env::var("MQTT_PASS").unwrap_or_default();
        mqtt_options.set_credentials(user, pass);
    }

    let (mqtt, mut eventloop) = AsyncClient::new(mqtt_options, 32);

    mqtt.subscribe(TOPIC_NODE_STATE, QoS::AtMostOnce)
        .await
        .context("failed to subscribe to node state")?;
    mqtt.publish(TOPIC_SENSOR_STATUS, QoS::AtLeastOnce, true, "online")
        .await
        .context("failed to publish sensor online status")?;

    let node = Arc::new(Mutex::new(NodeView::default()));
    let node_updates = node.clone();

    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message)))
                    if message.topic == TOPIC_NODE_STATE =>
                {
                    match serde_json::from_slice::<NodeView>(&message.payload) {
                        Ok(view) => *node_updates.lock().await = view,
                        Err(err) => warn!("unreadable node state: {err}"),
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("sensor mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });

    info!("room simulation started at {initial_c:.1} °C, tick {tick_seconds}s");

    let mut room = RoomModel::new(initial_c);
    let mut interval = tokio::time::interval(Duration::from_secs(tick_seconds));

    loop {
        interval.tick().await;

        let view = *node.lock().await;
        let occupied = is_office_hours(view.day, view.hour);
        let celsius = room.step(view.heating_on, occupied);
        debug!(
            "room {celsius:.2} °C (heating {}, occupied {occupied})",
            view.heating_on
        );

        mqtt.publish(
            TOPIC_SENSOR_TEMP,
            QoS::AtLeastOnce,
            true,
            format!("{celsius:.1}"),
        )
        .await
        .context("failed to publish sensor temperature")?;
    }
}
