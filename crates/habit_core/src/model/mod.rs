mod plan;

pub use plan::{
    DailyTask, Difficulty, HabitPlan, MotivationalMessage, PlanDuration, WeeklyCheckpoint,
    MILESTONE_DAYS,
};
