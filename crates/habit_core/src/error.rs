use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidPlanShape(String),
    TaskNotFound(String),
    InvalidDay(String),
    GenerationFailed(String),
    InvalidInput(String),
    InvalidData(String),
    Io(String),
}

impl AppError {
    pub fn invalid_plan_shape<M: Into<String>>(message: M) -> Self {
        Self::InvalidPlanShape(message.into())
    }

    pub fn task_not_found(day: u32) -> Self {
        Self::TaskNotFound(format!("no task for day {day}"))
    }

    pub fn invalid_day<M: Into<String>>(message: M) -> Self {
        Self::InvalidDay(message.into())
    }

    pub fn generation_failed<M: Into<String>>(message: M) -> Self {
        Self::GenerationFailed(message.into())
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPlanShape(_) => "invalid_plan_shape",
            Self::TaskNotFound(_) => "task_not_found",
            Self::InvalidDay(_) => "invalid_day",
            Self::GenerationFailed(_) => "generation_failed",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidPlanShape(message) => message,
            Self::TaskNotFound(message) => message,
            Self::InvalidDay(message) => message,
            Self::GenerationFailed(message) => message,
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
