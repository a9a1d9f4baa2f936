mod occupancy;
mod occurrence;
mod paced_train;
mod path;
mod train_schedule;
mod waypoint;

pub use occupancy::{Direction, OccupancyZone, ZoneInterval};
pub use occurrence::{Occurrence, OccurrenceId, SimulationSummary, TrainId, TrainStatus};
pub use paced_train::{
    ChangeGroup, ChangeGroups, ExceptionKind, Paced, PacedTrain, PacedTrainException,
    PathAndScheduleChangeGroup, RollingStockChangeGroup,
};
pub use path::{PathData, PathPoint, ProjectedTrain, SpaceTimeCurve};
pub use train_schedule::{
    Comfort, Distribution, Margins, PathItem, PowerRestrictionItem, ScheduleItem, TrainCategory,
    TrainSchedule, TrainScheduleOptions,
};
pub use waypoint::Waypoint;
