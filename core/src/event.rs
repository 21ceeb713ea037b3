use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type FarmId = i32;
pub type SectorId = i32;

/// One irrigation application of a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub farm_id: FarmId,
    pub sector_id: SectorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub nominal_amount: f64,
    pub real_amount: f64,
    pub efficiency: f64,
}

/// Selects the events of a farm, optionally narrowed to one sector,
/// whose `start_time` lies inside the closed window `[from, until]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventFilter {
    pub farm_id: FarmId,
    pub sector_id: Option<SectorId>,
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl EventFilter {
    pub fn matches(&self, event: &IrrigationEvent) -> bool {
        event.farm_id == self.farm_id
            && self.sector_id.map_or(true, |id| event.sector_id == id)
            && self.from <= event.start_time
            && event.start_time <= self.until
    }
}
