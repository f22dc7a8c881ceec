use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{FuelLogRecord, FuelType};

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("field `{field}` is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("field `{field}` is not a boolean: {value:?}")]
    NotBoolean { field: &'static str, value: String },
    #[error("field `{field}` is not a timestamp: {value:?}")]
    NotTimestamp { field: &'static str, value: String },
    #[error("unknown fuel type {0:?}")]
    UnknownFuelType(String),
    #[error("field `{field}` {rule}, got {value}")]
    OutOfRange {
        field: &'static str,
        rule: &'static str,
        value: f64,
    },
}

/// A scalar as the storage layer hands it back: numbers sometimes arrive
/// as strings, flags as 0/1.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Loose {
    fn as_f64(&self, field: &'static str) -> Result<f64, IngestError> {
        let value = match self {
            Loose::Number(n) => *n,
            Loose::Text(s) => parse_decimal(s).ok_or_else(|| IngestError::NotNumeric {
                field,
                value: s.clone(),
            })?,
            Loose::Bool(b) => {
                return Err(IngestError::NotNumeric {
                    field,
                    value: b.to_string(),
                })
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(IngestError::NotNumeric {
                field,
                value: value.to_string(),
            })
        }
    }

    fn as_bool(&self, field: &'static str) -> Result<bool, IngestError> {
        match self {
            Loose::Bool(b) => Ok(*b),
            Loose::Number(n) if *n == 0.0 => Ok(false),
            Loose::Number(n) if *n == 1.0 => Ok(true),
            Loose::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => Ok(true),
                "false" | "f" | "0" | "no" | "" => Ok(false),
                _ => Err(IngestError::NotBoolean {
                    field,
                    value: s.clone(),
                }),
            },
            Loose::Number(n) => Err(IngestError::NotBoolean {
                field,
                value: n.to_string(),
            }),
        }
    }
}

/// A row id: integers stay exact, anything else is kept as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
    Float(f64),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Text(s) => s,
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Parse "50", " 50.5 " or a comma decimal like "50,5".
fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    if trimmed.contains(',') && !trimmed.contains('.') {
        return trimmed.replace(',', ".").parse().ok();
    }
    None
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_fuel_type(raw: &str) -> Result<FuelType, IngestError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "diesel" => Ok(FuelType::Diesel),
        "arla32" | "arla" | "arla 32" => Ok(FuelType::Arla32),
        other => Err(IngestError::UnknownFuelType(other.to_string())),
    }
}

/// A fuel log row from a storage export, before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFuelLog {
    pub id: Option<RawId>,
    pub user_id: Option<String>,
    pub odometer: Option<Loose>,
    pub liters: Option<Loose>,
    pub arla_liters: Option<Loose>,
    pub total_price: Option<Loose>,
    pub is_full_tank: Option<Loose>,
    pub fuel_type: Option<String>,
    pub station_name: Option<String>,
    pub created_at: Option<String>,
}

impl RawFuelLog {
    /// Coerce into a strict record. `owner_id` is used when the row
    /// carries no `user_id` of its own.
    pub fn into_record(self, owner_id: &str) -> Result<FuelLogRecord, IngestError> {
        let id = self.id.ok_or(IngestError::Missing("id"))?.into_text();
        let odometer_km = self
            .odometer
            .ok_or(IngestError::Missing("odometer"))?
            .as_f64("odometer")?;
        let liters = self
            .liters
            .ok_or(IngestError::Missing("liters"))?
            .as_f64("liters")?;
        let arla_liters = match self.arla_liters {
            Some(v) => v.as_f64("arla_liters")?,
            None => 0.0,
        };
        let total_price = match self.total_price {
            Some(v) => v.as_f64("total_price")?,
            None => 0.0,
        };
        let is_full_tank = match self.is_full_tank {
            Some(v) => v.as_bool("is_full_tank")?,
            None => false,
        };
        let fuel_type = match self.fuel_type {
            Some(s) => parse_fuel_type(&s)?,
            None => FuelType::Diesel,
        };
        let raw_created = self.created_at.ok_or(IngestError::Missing("created_at"))?;
        let created_at =
            parse_timestamp(&raw_created).ok_or_else(|| IngestError::NotTimestamp {
                field: "created_at",
                value: raw_created.clone(),
            })?;

        Ok(FuelLogRecord {
            id,
            owner_id: self.user_id.unwrap_or_else(|| owner_id.to_string()),
            odometer_km,
            liters,
            arla_liters,
            total_price,
            is_full_tank,
            fuel_type,
            station_name: self.station_name.filter(|s| !s.trim().is_empty()),
            created_at,
        })
    }
}

/// Parse a JSON array of exported rows.
pub fn parse_raw_logs(json: &str) -> Result<Vec<RawFuelLog>, serde_json::Error> {
    serde_json::from_str(json)
}

/// A fill-up as submitted by the driver.
#[derive(Debug, Clone)]
pub struct NewFuelLog {
    pub odometer_km: f64,
    pub liters: f64,
    pub total_price: f64,
    pub arla_liters: f64,
    pub is_full_tank: bool,
    pub fuel_type: FuelType,
    pub station_name: Option<String>,
}

fn check(field: &'static str, value: f64, positive: bool) -> Result<(), IngestError> {
    let ok = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
    if ok {
        Ok(())
    } else {
        Err(IngestError::OutOfRange {
            field,
            rule: if positive {
                "must be greater than zero"
            } else {
                "must not be negative"
            },
            value,
        })
    }
}

impl NewFuelLog {
    pub fn validate(&self) -> Result<(), IngestError> {
        check("odometer", self.odometer_km, true)?;
        check("liters", self.liters, true)?;
        check("total_price", self.total_price, true)?;
        check("arla_liters", self.arla_liters, false)?;
        Ok(())
    }

    pub fn into_record(
        self,
        owner_id: &str,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Result<FuelLogRecord, IngestError> {
        self.validate()?;
        Ok(FuelLogRecord {
            id,
            owner_id: owner_id.to_string(),
            odometer_km: self.odometer_km,
            liters: self.liters,
            arla_liters: self.arla_liters,
            total_price: self.total_price,
            is_full_tank: self.is_full_tank,
            fuel_type: self.fuel_type,
            station_name: self.station_name,
            created_at,
        })
    }
}
