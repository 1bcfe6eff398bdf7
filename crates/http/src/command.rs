//! Names and access rules of the slash commands.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    AddPath,
    LinkChannel,
    AddTopic,
    AddTask,
    DeleteTask,
    DeleteTopic,
    DeletePath,
    ListTopics,
    Status,
    Checklist,
    Complete,
    UserSummary,
    UserProgress,
    ListUsers,
    AddUsersFromChannel,
    CommandMetrics,
    FunctionUsage,
    SubmitCode,
    RequestSatisfaction,
    Survey,
    Channel,
    Path,
    Help,
}

impl Command {
    pub const ALL: [Self; 23] = [
        Self::AddPath,
        Self::LinkChannel,
        Self::AddTopic,
        Self::AddTask,
        Self::DeleteTask,
        Self::DeleteTopic,
        Self::DeletePath,
        Self::ListTopics,
        Self::Status,
        Self::Checklist,
        Self::Complete,
        Self::UserSummary,
        Self::UserProgress,
        Self::ListUsers,
        Self::AddUsersFromChannel,
        Self::CommandMetrics,
        Self::FunctionUsage,
        Self::SubmitCode,
        Self::RequestSatisfaction,
        Self::Survey,
        Self::Channel,
        Self::Path,
        Self::Help,
    ];

    /// Name used in the route and in usage events.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddPath => "addpath",
            Self::LinkChannel => "linkchannel",
            Self::AddTopic => "addtopic",
            Self::AddTask => "addtask",
            Self::DeleteTask => "deletetask",
            Self::DeleteTopic => "deletetopic",
            Self::DeletePath => "deletepath",
            Self::ListTopics => "listtopics",
            Self::Status => "status",
            Self::Checklist => "checklist",
            Self::Complete => "complete",
            Self::UserSummary => "usersummary",
            Self::UserProgress => "userprogress",
            Self::ListUsers => "listusers",
            Self::AddUsersFromChannel => "add_users_from_channel",
            Self::CommandMetrics => "commandmetrics",
            Self::FunctionUsage => "functionusage",
            Self::SubmitCode => "submit-code",
            Self::RequestSatisfaction => "request_satisfaction",
            Self::Survey => "survey",
            Self::Channel => "channel",
            Self::Path => "path",
            Self::Help => "help",
        }
    }

    pub const fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AddPath
                | Self::LinkChannel
                | Self::AddTopic
                | Self::AddTask
                | Self::DeleteTask
                | Self::DeleteTopic
                | Self::DeletePath
                | Self::UserSummary
                | Self::UserProgress
                | Self::ListUsers
                | Self::AddUsersFromChannel
                | Self::CommandMetrics
                | Self::FunctionUsage
                | Self::RequestSatisfaction
        )
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::AddPath => "Create a new path (name, duration_weeks).",
            Self::LinkChannel => "Link a channel to a path with a start date.",
            Self::AddTopic => "Add a topic to a week of a path.",
            Self::AddTask => "Add a task to a topic.",
            Self::DeleteTask => "Delete a task.",
            Self::DeleteTopic => "Delete a topic and its tasks.",
            Self::DeletePath => "Delete a path with its topics, tasks and channel links.",
            Self::ListTopics => "List the topics of a path for one week (path_id, week).",
            Self::Status => "Show your task status for this channel's path.",
            Self::Checklist => "Show the weekly checklist with due dates.",
            Self::Complete => "Mark one of your tasks as completed with a proof URL.",
            Self::UserSummary => "Completed and pending task counts per user.",
            Self::UserProgress => "Per-user task progress, one user per page.",
            Self::ListUsers => "List the users of this channel.",
            Self::AddUsersFromChannel => "Record the members of this channel.",
            Self::CommandMetrics => {
                "Command usage counts (period, start_date, metric_type: channels or paths)."
            },
            Self::FunctionUsage => "Users who used a command (function_name).",
            Self::SubmitCode => "Run a code snippet (language: python, c, cpp, javascript, java).",
            Self::RequestSatisfaction => "Send the satisfaction survey to the channel.",
            Self::Survey => "Answer the satisfaction survey.",
            Self::Channel => "Show this channel's name and ID.",
            Self::Path => "Show the path linked to this channel.",
            Self::Help => "List the available commands.",
        }
    }

    /// The command list shown by `help`.
    pub fn help_text() -> String {
        let mut out = String::from("**Available commands**\n");
        for command in Self::ALL {
            let _ = writeln!(out, "/{} - {}", command.as_str(), command.description());
        }
        out
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or(UnknownCommand(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for command in Command::ALL {
            assert_eq!(command.as_str().parse::<Command>(), Ok(command));
        }
        assert_eq!("/Status".parse::<Command>(), Ok(Command::Status));
        assert!("launch".parse::<Command>().is_err());
    }

    #[test]
    fn learner_commands_are_open() {
        for open in [Command::Status, Command::Checklist, Command::Complete, Command::Survey] {
            assert!(!open.requires_admin());
        }
        assert!(Command::DeletePath.requires_admin());
        assert!(Command::RequestSatisfaction.requires_admin());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::help_text();
        for command in Command::ALL {
            assert!(help.contains(&format!("/{} ", command.as_str())));
        }
    }
}
