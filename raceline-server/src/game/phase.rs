pub enum RacePhase {
    // Racers are on the grid and can't move yet
    CountingDownToStart { ticks_left: u64 },
    // Checkpoint triggers are live and rankings update every tick
    Racing,
    // Everyone crossed the line for the last time; show standings
    AllRacersDone,
}

impl RacePhase {
    pub fn is_done(&self) -> bool {
        matches!(self, RacePhase::AllRacersDone)
    }
}
