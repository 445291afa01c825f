use chrono::NaiveTime;

/// Clock frame of one pair. Pair numbers are ordinals, not times;
/// this table is the only place they map to the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct BellSlot {
    pub pair_number: u8,
    pub start_time: &'static str,
    pub end_time: &'static str,
}

pub const BELL_SCHEDULE: [BellSlot; 5] = [
    BellSlot { pair_number: 1, start_time: "08:30", end_time: "09:50" },
    BellSlot { pair_number: 2, start_time: "10:00", end_time: "11:20" },
    BellSlot { pair_number: 3, start_time: "11:40", end_time: "13:00" },
    BellSlot { pair_number: 4, start_time: "13:10", end_time: "14:30" },
    BellSlot { pair_number: 5, start_time: "14:50", end_time: "16:10" },
];

pub fn bell_slot(pair_number: u8) -> Option<BellSlot> {
    BELL_SCHEDULE
        .iter()
        .copied()
        .find(|s| s.pair_number == pair_number)
}

impl BellSlot {
    /// Whether the given wall-clock time falls inside this pair
    /// (inclusive on both ends, matching the highlight behavior).
    pub fn contains(&self, time: NaiveTime) -> bool {
        let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M");
        match (parse(self.start_time), parse(self.end_time)) {
            (Ok(start), Ok(end)) => time >= start && time <= end,
            _ => false,
        }
    }
}
