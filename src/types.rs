use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What went into the tank. Informational only; consumption math ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Diesel,
    Arla32,
}

impl FuelType {
    pub fn label(self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Arla32 => "arla32",
        }
    }
}

/// One fill-up event, as stored for a single owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelLogRecord {
    pub id: String,
    pub owner_id: String,
    pub odometer_km: f64,
    pub liters: f64,
    /// Additive volume. Never part of fuel volume or consumption math.
    pub arla_liters: f64,
    pub total_price: f64,
    pub is_full_tank: bool,
    pub fuel_type: FuelType,
    pub station_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived statistics for one owner's logs. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStatsSnapshot {
    /// km per liter; `None` until two full tanks bracket a distance.
    #[serde(rename = "average_consumption")]
    pub average_consumption_km_per_liter: Option<f64>,
    pub total_liters: f64,
    pub total_spent: f64,
    #[serde(rename = "last_full_tank_odometer")]
    pub last_full_tank_odometer_km: Option<f64>,
    #[serde(rename = "last_full_tank_date")]
    pub last_full_tank_timestamp: Option<DateTime<Utc>>,
    pub partial_fill_count: usize,
    pub full_tank_count: usize,
    pub average_price_per_liter: Option<f64>,
}

impl FuelStatsSnapshot {
    pub fn empty() -> Self {
        Self {
            average_consumption_km_per_liter: None,
            total_liters: 0.0,
            total_spent: 0.0,
            last_full_tank_odometer_km: None,
            last_full_tank_timestamp: None,
            partial_fill_count: 0,
            full_tank_count: 0,
            average_price_per_liter: None,
        }
    }
}

/// The stats payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStatsReport {
    #[serde(flatten)]
    pub stats: FuelStatsSnapshot,
    pub logs_count: usize,
    pub suggest_full_tank: bool,
    pub period: String,
}
