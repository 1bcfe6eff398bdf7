//! Interaction navigation: a finite state machine over selection steps,
//! plus a per-session pager for multi-page reports.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A step of a navigation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    SelectPath,
    SelectTopic,
    SelectWeek,
    SelectTask,
    Submit,
    Confirm,
    Done,
}

impl Step {
    #[must_use]
    pub const fn is_selection(&self) -> bool {
        matches!(self, Self::SelectPath | Self::SelectTopic | Self::SelectWeek | Self::SelectTask)
    }
}

/// A multi-step interaction started by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    LinkChannel,
    AddTopic,
    AddTask,
    Complete,
    DeleteTask,
    DeleteTopic,
    DeletePath,
    SubmitCode,
    CorrectStartDate,
    Survey,
}

impl Flow {
    /// Fixed steps of the flow, not counting the final `Done`.
    #[must_use]
    pub const fn steps(&self) -> &'static [Step] {
        match self {
            Self::LinkChannel => &[Step::SelectPath, Step::Submit],
            Self::AddTopic => &[Step::SelectPath, Step::SelectWeek, Step::Submit],
            Self::AddTask => &[Step::SelectPath, Step::SelectTopic, Step::Submit],
            Self::Complete => &[Step::SelectWeek, Step::SelectTask, Step::Submit],
            Self::DeleteTask => {
                &[Step::SelectPath, Step::SelectTopic, Step::SelectTask, Step::Confirm]
            },
            Self::DeleteTopic => &[Step::SelectPath, Step::SelectTopic, Step::Confirm],
            Self::DeletePath => &[Step::SelectPath, Step::Confirm],
            Self::SubmitCode | Self::CorrectStartDate | Self::Survey => &[Step::Submit],
        }
    }

    /// Whether a conflict found after submit may insert a confirmation step.
    #[must_use]
    pub const fn allows_late_confirmation(&self) -> bool {
        matches!(self, Self::LinkChannel)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LinkChannel => "linkchannel",
            Self::AddTopic => "addtopic",
            Self::AddTask => "addtask",
            Self::Complete => "complete",
            Self::DeleteTask => "deletetask",
            Self::DeleteTopic => "deletetopic",
            Self::DeletePath => "deletepath",
            Self::SubmitCode => "submit-code",
            Self::CorrectStartDate => "correct-start-date",
            Self::Survey => "survey",
        }
    }
}

/// Identifiers resolved so far. Handlers only receive fully resolved values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub path_id: Option<String>,
    pub topic_id: Option<String>,
    pub week: Option<u32>,
    pub task_id: Option<String>,
}

/// Position of one interaction inside its flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    flow: Flow,
    position: usize,
    late_confirm: bool,
    cancelled: bool,
    pub selections: Selections,
}

impl NavState {
    #[must_use]
    pub fn new(flow: Flow) -> Self {
        Self::with_selections(flow, Selections::default())
    }

    /// Start a flow with some identifiers already known (e.g. the channel's path).
    #[must_use]
    pub const fn with_selections(flow: Flow, selections: Selections) -> Self {
        Self { flow, position: 0, late_confirm: false, cancelled: false, selections }
    }

    #[must_use]
    pub const fn flow(&self) -> Flow {
        self.flow
    }

    #[must_use]
    pub fn current(&self) -> Step {
        if self.late_confirm {
            return Step::Confirm;
        }
        self.flow.steps().get(self.position).copied().unwrap_or(Step::Done)
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.current() == Step::Done
    }

    /// True when the flow ended through a declined confirmation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Record the value chosen at the current selection step and advance.
    ///
    /// # Errors
    /// Returns `CoreError::Navigation` when the current step is not a selection,
    /// and `CoreError::InvalidInput` for an empty value or a non-numeric week.
    pub fn select(&mut self, value: &str) -> Result<Step, CoreError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::InvalidInput("selection must not be empty".to_owned()));
        }
        match self.current() {
            Step::SelectPath => self.selections.path_id = Some(value.to_owned()),
            Step::SelectTopic => self.selections.topic_id = Some(value.to_owned()),
            Step::SelectTask => self.selections.task_id = Some(value.to_owned()),
            Step::SelectWeek => {
                let week = value
                    .parse::<u32>()
                    .map_err(|_| CoreError::InvalidInput(format!("invalid week '{value}'")))?;
                self.selections.week = Some(week);
            },
            other => return Err(self.unexpected("select", other)),
        }
        Ok(self.advance())
    }

    /// Accept the form at the current `Submit` step and advance.
    ///
    /// # Errors
    /// Returns `CoreError::Navigation` when the current step is not `Submit`.
    pub fn submit(&mut self) -> Result<Step, CoreError> {
        match self.current() {
            Step::Submit => Ok(self.advance()),
            other => Err(self.unexpected("submit", other)),
        }
    }

    /// Insert a confirmation step after a submitted form hit a conflict.
    ///
    /// # Errors
    /// Returns `CoreError::Navigation` when the flow does not support it or is not finished.
    pub fn require_confirmation(&mut self) -> Result<Step, CoreError> {
        if !self.flow.allows_late_confirmation() || !self.is_done() {
            return Err(CoreError::Navigation(format!(
                "{} cannot ask for confirmation now",
                self.flow.as_str()
            )));
        }
        self.late_confirm = true;
        Ok(Step::Confirm)
    }

    /// Answer the current `Confirm` step. Declining ends the flow as cancelled.
    ///
    /// # Errors
    /// Returns `CoreError::Navigation` when the current step is not `Confirm`.
    pub fn confirm(&mut self, accepted: bool) -> Result<Step, CoreError> {
        match self.current() {
            Step::Confirm => {
                self.cancelled = !accepted;
                if self.late_confirm {
                    self.late_confirm = false;
                    Ok(Step::Done)
                } else {
                    Ok(self.advance())
                }
            },
            other => Err(self.unexpected("confirm", other)),
        }
    }

    fn advance(&mut self) -> Step {
        self.position = self.position.saturating_add(1).min(self.flow.steps().len());
        self.current()
    }

    fn unexpected(&self, action: &str, step: Step) -> CoreError {
        CoreError::Navigation(format!("cannot {action} at step {step:?} of {}", self.flow.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageDirection {
    Next,
    Previous,
}

/// Pages of a report with a per-session cursor. Moves clamp at both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager<T> {
    pages: Vec<T>,
    index: usize,
}

impl<T> Pager<T> {
    /// # Errors
    /// Returns `CoreError::InvalidInput` when there are no pages.
    pub fn new(pages: Vec<T>) -> Result<Self, CoreError> {
        if pages.is_empty() {
            return Err(CoreError::InvalidInput("nothing to page through".to_owned()));
        }
        Ok(Self { pages, index: 0 })
    }

    pub fn turn(&mut self, direction: PageDirection) -> &T {
        self.index = match direction {
            PageDirection::Next => (self.index + 1).min(self.pages.len() - 1),
            PageDirection::Previous => self.index.saturating_sub(1),
        };
        self.current()
    }

    #[must_use]
    pub fn current(&self) -> &T {
        &self.pages[self.index]
    }

    /// Zero-based position of the current page.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
