pub const TOPIC_SENSOR_TEMP: &str = "office/sensor/temperature";
pub const TOPIC_SENSOR_STATUS: &str = "office/sensor/status";

pub const TOPIC_NODE_STATE: &str = "office/node/state";
pub const TOPIC_NODE_SCHEDULE_STATE: &str = "office/node/schedule/state";

pub const TOPIC_CMD_SCHEDULE: &str = "office/cmnd/schedule";
pub const TOPIC_CMD_TIME_SYNC: &str = "office/cmnd/time-sync";
pub const TOPIC_CMD_SETTINGS: &str = "office/cmnd/settings";
pub const TOPIC_CMD_OVERRIDE: &str = "office/cmnd/override";
