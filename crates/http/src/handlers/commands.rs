//! Slash command dispatch.
//!
//! Every recognised invocation that passes the admin check is recorded as a
//! usage event before it runs. Domain failures become `error` replies.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use pathbot_core::{Flow, MetricsPeriod, NavState, Selections, StatusReport, UsageGrouping};
use pathbot_service::{CodeService, ServiceError, parse_week, render, survey_recipients};

use crate::AppState;
use crate::api_error::{ApiError, error_reply};
use crate::api_types::{BroadcastForm, CommandReply, CommandRequest};
use crate::command::Command;
use crate::handlers::{flows, open_pages};
use crate::session::{FlowContext, FlowSession, SessionRegistry, SessionState};

const NO_USERS: &str = "No users found in this channel.";
const NO_TOPICS: &str = "No topics found for this path.";
const NO_TASKS: &str = "There are no tasks available for this path.";

pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandReply>, ApiError> {
    let command: Command =
        name.parse().map_err(|_| ApiError::NotFound(format!("Unknown command '{name}'.")))?;
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_owned()));
    }

    if command.requires_admin() && !state.members.is_admin(&req.roles) {
        tracing::info!(command = command.as_str(), user_id = %req.user_id, "admin command refused");
        return Ok(Json(CommandReply::error(
            "forbidden",
            "You do not have permission to use this command.",
        )));
    }

    if let Err(err) = state
        .metrics
        .record_usage(&req.user_id, command.as_str(), req.channel_id.as_deref(), state.clock.now())
        .await
    {
        tracing::warn!(command = command.as_str(), error = %err, "failed to record command usage");
    }

    tracing::debug!(command = command.as_str(), user_id = %req.user_id, "dispatching command");
    let reply = dispatch(&state, command, &req).await.unwrap_or_else(|err| error_reply(&err));
    Ok(Json(reply))
}

async fn dispatch(
    state: &AppState,
    command: Command,
    req: &CommandRequest,
) -> Result<CommandReply, ServiceError> {
    let owner = req.user_id.as_str();
    match command {
        Command::AddPath => {
            let path = state
                .curriculum
                .add_path(req.arg("name").unwrap_or(""), req.arg("duration_weeks").unwrap_or(""))
                .await?;
            Ok(CommandReply::message(format!(
                "Path \"{}\" created with ID {} and a duration of {} weeks.",
                path.name, path.id, path.duration_weeks
            )))
        },
        Command::LinkChannel => Ok(start_flow(state, req, Flow::LinkChannel).await),
        Command::AddTopic => Ok(start_flow(state, req, Flow::AddTopic).await),
        Command::AddTask => Ok(start_flow(state, req, Flow::AddTask).await),
        Command::DeleteTask => Ok(start_flow(state, req, Flow::DeleteTask).await),
        Command::DeleteTopic => Ok(start_flow(state, req, Flow::DeleteTopic).await),
        Command::DeletePath => Ok(start_flow(state, req, Flow::DeletePath).await),
        Command::ListTopics => {
            let path_id = required(req, "path_id")?;
            let week = parse_week(req.arg("week").unwrap_or(""))?;
            let topics = state.curriculum.topics_for_week(path_id, week).await?;
            Ok(CommandReply::message(render::topic_list(path_id, week, &topics)))
        },
        Command::Status => status(state, req).await,
        Command::Checklist => checklist(state, req).await,
        Command::Complete => complete(state, req).await,
        Command::UserSummary => {
            let channel_id = channel(req)?;
            let learners = state.members.learners(channel_id, &req.members).await?;
            if learners.is_empty() {
                return Ok(CommandReply::message(NO_USERS));
            }
            let view = state.progress.user_summary(channel_id, &learners).await?;
            Ok(CommandReply::message(render::summary_table(&view)))
        },
        Command::UserProgress => {
            let channel_id = channel(req)?;
            let learners = state.members.learners(channel_id, &req.members).await?;
            if learners.is_empty() {
                return Ok(CommandReply::message(NO_USERS));
            }
            let view = state.progress.user_progress(channel_id, &learners).await?;
            Ok(open_pages(state, owner, render::user_progress_pages(&view), NO_USERS).await)
        },
        Command::ListUsers => list_users(state, req).await,
        Command::AddUsersFromChannel => {
            let channel_id = channel(req)?;
            if req.members.is_empty() {
                return Ok(CommandReply::message(NO_USERS));
            }
            let added = state.members.register_members(channel_id, &req.members).await?;
            Ok(CommandReply::message(format!("Added {added} users from this channel.")))
        },
        Command::CommandMetrics => {
            let period = MetricsPeriod::parse(req.arg("period"), req.arg("start_date"))?;
            let grouping: UsageGrouping = req.arg("metric_type").unwrap_or("").parse()?;
            let view = state.metrics.command_metrics(period, grouping, state.clock.now()).await?;
            Ok(CommandReply::message(render::metrics_table(&view)))
        },
        Command::FunctionUsage => {
            let function_name = required(req, "function_name")?;
            let users = state.metrics.function_usage(function_name).await?;
            if users.is_empty() {
                return Ok(CommandReply::message(format!("No users have used {function_name}.")));
            }
            Ok(CommandReply::message(format!("Users who used {function_name}: {}", users.join(", "))))
        },
        Command::SubmitCode => {
            let language = CodeService::language(required(req, "language")?)?;
            if !state.code.is_configured() {
                return Err(ServiceError::NotConfigured("code execution is not configured".to_owned()));
            }
            let context = FlowContext { language: Some(language), ..FlowContext::default() };
            Ok(flows::start(state, owner, NavState::new(Flow::SubmitCode), context).await)
        },
        Command::RequestSatisfaction => request_satisfaction(state, req).await,
        Command::Survey => Ok(start_flow(state, req, Flow::Survey).await),
        Command::Channel => {
            let channel_id = channel(req)?;
            let stored = state.curriculum.channel_name(channel_id).await?;
            let name = stored
                .or_else(|| req.channel_name.clone())
                .unwrap_or_else(|| channel_id.to_owned());
            Ok(CommandReply::message(format!("You are in channel **{name}** (ID: {channel_id}).")))
        },
        Command::Path => {
            let binding = state.curriculum.require_binding(channel(req)?).await?;
            Ok(CommandReply::message(format!(
                "This channel is linked to path **{}**.",
                binding.path_name
            )))
        },
        Command::Help => Ok(CommandReply::message(Command::help_text())),
    }
}

async fn start_flow(state: &AppState, req: &CommandRequest, flow: Flow) -> CommandReply {
    let context = FlowContext {
        channel_id: req.channel_id.clone(),
        channel_name: req.channel_name.clone(),
        ..FlowContext::default()
    };
    flows::start(state, &req.user_id, NavState::new(flow), context).await
}

async fn status(state: &AppState, req: &CommandRequest) -> Result<CommandReply, ServiceError> {
    let channel_id = channel(req)?;
    match state.progress.status(channel_id, &req.user_id, state.clock.today()).await {
        Ok(view) => match view.report {
            StatusReport::NoTopics => Ok(CommandReply::message(NO_TOPICS)),
            StatusReport::NoTasks => Ok(CommandReply::message(NO_TASKS)),
            StatusReport::Weeks(_) => {
                Ok(open_pages(state, &req.user_id, render::status_pages(&view), NO_TASKS).await)
            },
        },
        Err(err @ ServiceError::InvalidDate { .. }) => Ok(start_date_correction(state, req, &err).await),
        Err(err) => Err(err),
    }
}

async fn checklist(state: &AppState, req: &CommandRequest) -> Result<CommandReply, ServiceError> {
    let channel_id = channel(req)?;
    match state.progress.checklist(channel_id, state.clock.today()).await {
        Ok(view) => Ok(open_pages(state, &req.user_id, render::checklist_pages(&view), NO_TOPICS).await),
        Err(err @ ServiceError::InvalidDate { .. }) => Ok(start_date_correction(state, req, &err).await),
        Err(err) => Err(err),
    }
}

/// A stored start date that does not parse: ask for a corrected one.
async fn start_date_correction(
    state: &AppState,
    req: &CommandRequest,
    err: &ServiceError,
) -> CommandReply {
    tracing::warn!(channel_id = ?req.channel_id, error = %err, "stored start date is malformed");
    let reply = start_flow(state, req, Flow::CorrectStartDate).await;
    match reply {
        CommandReply::Form { session_id, fields, .. } => CommandReply::Form {
            session_id,
            title: format!("{err} Please enter the correct start date."),
            fields,
        },
        other => other,
    }
}

async fn complete(state: &AppState, req: &CommandRequest) -> Result<CommandReply, ServiceError> {
    let channel_id = channel(req)?;
    let (path, weeks) = state.progress.incomplete_weeks(channel_id, &req.user_id).await?;
    if weeks.is_empty() {
        return Ok(CommandReply::message("You have no incomplete tasks."));
    }
    let nav = NavState::with_selections(
        Flow::Complete,
        Selections { path_id: Some(path.id), ..Selections::default() },
    );
    let context = FlowContext { channel_id: Some(channel_id.to_owned()), ..FlowContext::default() };
    Ok(flows::start(state, &req.user_id, nav, context).await)
}

async fn list_users(state: &AppState, req: &CommandRequest) -> Result<CommandReply, ServiceError> {
    let channel_id = channel(req)?;
    let names: Vec<String> = if req.members.is_empty() {
        state.members.channel_members(channel_id).await?.into_iter().map(|m| m.user_name).collect()
    } else {
        req.members.iter().filter(|m| !m.bot).map(|m| m.name.clone()).collect()
    };
    if names.is_empty() {
        return Ok(CommandReply::message(NO_USERS));
    }
    Ok(CommandReply::message(format!("Users in this channel:\n{}", names.join("\n"))))
}

/// One survey session per human member, handed to the gateway for delivery.
async fn request_satisfaction(
    state: &AppState,
    req: &CommandRequest,
) -> Result<CommandReply, ServiceError> {
    let recipients = survey_recipients(&req.members);
    if recipients.is_empty() {
        return Ok(CommandReply::message(NO_USERS));
    }
    let mut forms = Vec::with_capacity(recipients.len());
    for member in recipients {
        let id = SessionRegistry::new_id();
        let flow = FlowSession::new(NavState::new(Flow::Survey), FlowContext::default());
        state.sessions.store(id, &member.user_id, SessionState::Flow(Box::new(flow))).await;
        forms.push(BroadcastForm {
            user_id: member.user_id.clone(),
            session_id: id.to_string(),
            title: flows::SURVEY_TITLE.to_owned(),
            fields: flows::survey_fields(),
        });
    }
    tracing::info!(recipients = forms.len(), "satisfaction survey requested");
    Ok(CommandReply::Broadcast {
        text: format!("Requesting satisfaction feedback from {} users in the channel.", forms.len()),
        forms,
    })
}

fn channel(req: &CommandRequest) -> Result<&str, ServiceError> {
    req.channel_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ServiceError::Validation("This command can only be used in a channel.".to_owned()))
}

fn required<'a>(req: &'a CommandRequest, name: &str) -> Result<&'a str, ServiceError> {
    req.arg(name).ok_or_else(|| ServiceError::Validation(format!("{name} is required")))
}
