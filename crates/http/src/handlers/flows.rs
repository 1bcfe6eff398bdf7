//! Multi-step interactions: menus, forms and confirmations over a [`NavState`].
//!
//! An interaction is applied to a copy of the flow. The copy replaces the
//! stored flow only when the step succeeds, so a rejected form can be resent.

use std::collections::HashMap;

use pathbot_core::{ChannelBinding, Flow, NavState, SURVEY_FIELDS, Step};
use pathbot_service::{LinkOutcome, ServiceError, render};
use uuid::Uuid;

use crate::AppState;
use crate::api_error::error_reply;
use crate::api_types::{CommandReply, FormField, InteractionAction, MenuOption};
use crate::session::{FlowContext, FlowSession, PendingRelink, SessionRegistry, SessionState};

pub const SURVEY_TITLE: &str = "Satisfaction Survey";

pub fn survey_fields() -> Vec<FormField> {
    SURVEY_FIELDS
        .iter()
        .map(|(name, label)| {
            let field = FormField::line(name, label);
            if *name == "suggestions" { field.multiline() } else { field }
        })
        .collect()
}

/// Open `nav` for `owner` and reply with its first step.
pub async fn start(state: &AppState, owner: &str, nav: NavState, context: FlowContext) -> CommandReply {
    let id = SessionRegistry::new_id();
    let flow = FlowSession::new(nav, context);
    match prompt(state, id, owner, &flow).await {
        Ok(reply) => {
            if reply.awaits_interaction() {
                tracing::debug!(session_id = %id, flow = flow.nav.flow().as_str(), "interaction opened");
                state.sessions.store(id, owner, SessionState::Flow(Box::new(flow))).await;
            }
            reply
        },
        Err(err) => error_reply(&err),
    }
}

/// Apply one interaction to a flow taken out of the registry.
pub async fn advance(
    state: &AppState,
    id: Uuid,
    owner: &str,
    flow: FlowSession,
    action: InteractionAction,
) -> CommandReply {
    let mut next = flow.clone();
    let result = match apply(state, owner, &mut next, action).await {
        Ok(Some(reply)) => Ok(reply),
        Ok(None) => prompt(state, id, owner, &next).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(reply) => {
            if reply.awaits_interaction() {
                state.sessions.store(id, owner, SessionState::Flow(Box::new(next))).await;
            } else {
                tracing::debug!(session_id = %id, flow = next.nav.flow().as_str(), "interaction finished");
            }
            reply
        },
        Err(err) => {
            state.sessions.store(id, owner, SessionState::Flow(Box::new(flow))).await;
            error_reply(&err)
        },
    }
}

/// Returns a final reply when the flow ended, `None` when the next step should be prompted.
async fn apply(
    state: &AppState,
    owner: &str,
    flow: &mut FlowSession,
    action: InteractionAction,
) -> Result<Option<CommandReply>, ServiceError> {
    match action {
        InteractionAction::Select { value } => {
            if flow.nav.current().is_selection() && !offered(state, owner, flow, &value).await? {
                tracing::warn!(flow = flow.nav.flow().as_str(), value = %value, "selection not offered");
                return Err(ServiceError::Validation(
                    "That option is not available here.".to_owned(),
                ));
            }
            flow.nav.select(&value)?;
            Ok(None)
        },
        InteractionAction::Submit { fields } => submit(state, owner, flow, &fields).await,
        InteractionAction::Confirm { accepted } => confirm(state, flow, accepted).await,
        InteractionAction::Page { .. } => {
            Err(ServiceError::Validation("This interaction has no pages.".to_owned()))
        },
    }
}

async fn submit(
    state: &AppState,
    owner: &str,
    flow: &mut FlowSession,
    fields: &HashMap<String, String>,
) -> Result<Option<CommandReply>, ServiceError> {
    flow.nav.submit()?;
    let field = |name: &str| fields.get(name).map_or("", String::as_str);
    let selections = flow.nav.selections.clone();

    let text = match flow.nav.flow() {
        Flow::LinkChannel => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            return link_channel(state, flow, path_id, field("channel_id"), field("start_date")).await;
        },
        Flow::AddTopic => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let week = selections.week.ok_or_else(|| missing("week"))?;
            let topic =
                state.curriculum.add_topic(path_id, week, field("name"), field("description")).await?;
            format!("Topic \"{}\" added to path {} for week {}.", topic.name, topic.path_id, topic.week)
        },
        Flow::AddTask => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let topic_id = selected(selections.topic_id.as_deref(), "topic")?;
            state.curriculum.topic_in_path(path_id, topic_id).await?;
            let task = state.curriculum.add_task(topic_id, field("name")).await?;
            format!("Task \"{}\" added with ID {}.", task.name, task.id)
        },
        Flow::Complete => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let task_id = selected(selections.task_id.as_deref(), "task")?;
            let proof_url = field("proof_url").trim();
            let task = state.progress.mark_complete(owner, path_id, task_id, proof_url).await?;
            format!("Task \"{}\" marked as completed with proof URL: {proof_url}!", task.name)
        },
        Flow::SubmitCode => {
            let language = flow.context.language.ok_or_else(|| missing("language"))?;
            let outcome = state.code.run(language, field("source")).await?;
            render::run_outcome(&outcome)
        },
        Flow::CorrectStartDate => {
            let channel_id = selected(flow.context.channel_id.as_deref(), "channel")?;
            let start_date = state.curriculum.correct_start_date(channel_id, field("start_date")).await?;
            format!("Start date updated to {start_date}. Please re-run the /checklist or /status command.")
        },
        Flow::Survey => {
            state.surveys.submit(owner, fields).await?;
            "Thank you for your feedback!".to_owned()
        },
        other => {
            return Err(ServiceError::Validation(format!("{} has no form", other.as_str())));
        },
    };
    Ok(Some(CommandReply::message(text)))
}

async fn link_channel(
    state: &AppState,
    flow: &mut FlowSession,
    path_id: &str,
    channel_field: &str,
    start_date: &str,
) -> Result<Option<CommandReply>, ServiceError> {
    let context = &flow.context;
    let channel_id = match channel_field.trim() {
        "" => context.channel_id.clone().unwrap_or_default(),
        given => given.to_owned(),
    };
    // The gateway only knows the name of the channel the command came from.
    let channel_name =
        context.channel_name.clone().filter(|_| context.channel_id.as_deref() == Some(channel_id.as_str()));

    match state.curriculum.link_channel(path_id, &channel_id, channel_name.as_deref(), start_date).await? {
        LinkOutcome::Linked { binding } => Ok(Some(CommandReply::message(linked_text(&binding)))),
        LinkOutcome::NeedsConfirmation { current, requested } => {
            flow.nav.require_confirmation()?;
            flow.context.pending_relink =
                Some(PendingRelink { current_path: current.path_name, requested });
            Ok(None)
        },
    }
}

async fn confirm(
    state: &AppState,
    flow: &mut FlowSession,
    accepted: bool,
) -> Result<Option<CommandReply>, ServiceError> {
    flow.nav.confirm(accepted)?;
    let kind = flow.nav.flow();
    if flow.nav.is_cancelled() {
        let text = if kind == Flow::LinkChannel {
            "The channel link was not changed."
        } else {
            "Deletion cancelled."
        };
        return Ok(Some(CommandReply::message(text)));
    }

    let selections = flow.nav.selections.clone();
    let text = match kind {
        Flow::LinkChannel => {
            let pending = flow.context.pending_relink.take().ok_or_else(|| missing("relink"))?;
            state.curriculum.confirm_relink(&pending.requested).await?;
            linked_text(&pending.requested)
        },
        Flow::DeleteTask => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let topic_id = selected(selections.topic_id.as_deref(), "topic")?;
            let task_id = selected(selections.task_id.as_deref(), "task")?;
            let topic = state.curriculum.topic_in_path(path_id, topic_id).await?;
            state.curriculum.task_in_topic(&topic, task_id).await?;
            let task = state.curriculum.delete_task(task_id).await?;
            format!("Task \"{}\" with ID {} has been deleted.", task.name, task.id)
        },
        Flow::DeleteTopic => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let topic_id = selected(selections.topic_id.as_deref(), "topic")?;
            let path_name = state.curriculum.path_name(path_id).await?.unwrap_or_default();
            state.curriculum.topic_in_path(path_id, topic_id).await?;
            let topic = state.curriculum.delete_topic(topic_id).await?;
            format!(
                "Topic \"{}\" with ID {} has been deleted from path \"{path_name}\".",
                topic.name, topic.id
            )
        },
        Flow::DeletePath => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let path = state.curriculum.delete_path(path_id).await?;
            format!("Path \"{}\" with ID {} has been deleted.", path.name, path.id)
        },
        other => {
            return Err(ServiceError::Validation(format!("{} has nothing to confirm", other.as_str())));
        },
    };
    Ok(Some(CommandReply::message(text)))
}

/// The reply asking for the current step of `flow`.
async fn prompt(
    state: &AppState,
    id: Uuid,
    owner: &str,
    flow: &FlowSession,
) -> Result<CommandReply, ServiceError> {
    let session_id = id.to_string();
    let step = flow.nav.current();
    if step.is_selection() {
        return Ok(match choices(state, owner, flow).await? {
            Choices::Offered { prompt, options } => {
                CommandReply::Menu { session_id, prompt: prompt.to_owned(), options }
            },
            Choices::Empty(text) => CommandReply::message(text),
        });
    }
    match step {
        Step::Submit => {
            let (title, fields) = form(flow);
            Ok(CommandReply::Form { session_id, title, fields })
        },
        Step::Confirm => {
            let text = confirm_text(state, flow).await?;
            Ok(CommandReply::Confirm { session_id, text })
        },
        _ => Ok(CommandReply::message("Done.")),
    }
}

/// Menu of a selection step.
enum Choices {
    Offered { prompt: &'static str, options: Vec<MenuOption> },
    /// Nothing to choose from; the flow ends with this text.
    Empty(&'static str),
}

/// Whether `value` is one of the options the current selection step offers.
async fn offered(
    state: &AppState,
    owner: &str,
    flow: &FlowSession,
    value: &str,
) -> Result<bool, ServiceError> {
    let value = value.trim();
    Ok(match choices(state, owner, flow).await? {
        Choices::Offered { options, .. } => options.iter().any(|o| o.value == value),
        Choices::Empty(_) => false,
    })
}

async fn choices(state: &AppState, owner: &str, flow: &FlowSession) -> Result<Choices, ServiceError> {
    let kind = flow.nav.flow();
    let selections = &flow.nav.selections;

    match flow.nav.current() {
        Step::SelectPath => {
            let paths = state.curriculum.list_paths().await?;
            if paths.is_empty() {
                return Ok(Choices::Empty("No paths available."));
            }
            let prompt = if kind == Flow::DeletePath {
                "Please select a path to delete:"
            } else {
                "Please select a path:"
            };
            let options = paths.into_iter().map(|p| MenuOption::new(p.name, p.id)).collect();
            Ok(Choices::Offered { prompt, options })
        },
        Step::SelectTopic => {
            let path_id = selected(selections.path_id.as_deref(), "path")?;
            let topics = state.curriculum.list_topics(path_id).await?;
            if topics.is_empty() {
                return Ok(Choices::Empty("No topics found for this path."));
            }
            let prompt = if kind == Flow::DeleteTopic {
                "Please select a topic to delete:"
            } else {
                "Please select a topic:"
            };
            let options = topics
                .into_iter()
                .map(|t| MenuOption::new(format!("Week {}: {}", t.week, t.name), t.id))
                .collect();
            Ok(Choices::Offered { prompt, options })
        },
        Step::SelectWeek => {
            let weeks: Vec<u32> = if kind == Flow::Complete {
                let channel_id = selected(flow.context.channel_id.as_deref(), "channel")?;
                state.progress.incomplete_weeks(channel_id, owner).await?.1
            } else {
                let path_id = selected(selections.path_id.as_deref(), "path")?;
                state.curriculum.get_path(path_id).await?.weeks().collect()
            };
            if weeks.is_empty() {
                return Ok(Choices::Empty("You have no incomplete tasks."));
            }
            let options =
                weeks.into_iter().map(|w| MenuOption::new(format!("Week {w}"), w.to_string())).collect();
            Ok(Choices::Offered { prompt: "Please select a week:", options })
        },
        Step::SelectTask => {
            let (prompt, tasks, empty) = if kind == Flow::Complete {
                let path_id = selected(selections.path_id.as_deref(), "path")?;
                let week = selections.week.ok_or_else(|| missing("week"))?;
                (
                    "Please select a task to mark as completed:",
                    state.progress.incomplete_tasks(path_id, owner, week).await?,
                    "No incomplete tasks found for this week.",
                )
            } else {
                let topic_id = selected(selections.topic_id.as_deref(), "topic")?;
                (
                    "Please select a task to delete:",
                    state.curriculum.list_tasks(topic_id).await?,
                    "No tasks found for this topic.",
                )
            };
            if tasks.is_empty() {
                return Ok(Choices::Empty(empty));
            }
            let options = tasks.into_iter().map(|t| MenuOption::new(t.name, t.id)).collect();
            Ok(Choices::Offered { prompt, options })
        },
        other => Err(ServiceError::Validation(format!("{other:?} is not a selection"))),
    }
}

fn form(flow: &FlowSession) -> (String, Vec<FormField>) {
    let date = || FormField::line("start_date", "Start Date").with_placeholder("YYYY-MM-DD");
    match flow.nav.flow() {
        Flow::LinkChannel => {
            let mut channel = FormField::line("channel_id", "Channel ID");
            if let Some(current) = flow.context.channel_id.as_deref() {
                channel = channel.with_placeholder(current);
            }
            ("Link Channel".to_owned(), vec![channel, date()])
        },
        Flow::AddTopic => (
            "Add Topic".to_owned(),
            vec![
                FormField::line("name", "Topic Name"),
                FormField::line("description", "Description").multiline(),
            ],
        ),
        Flow::AddTask => ("Add Task".to_owned(), vec![FormField::line("name", "Task Name")]),
        Flow::Complete => (
            "Complete Task".to_owned(),
            vec![FormField::line("proof_url", "Proof URL").with_placeholder("https://")],
        ),
        Flow::SubmitCode => {
            let label = flow.context.language.map_or("", |l| l.label());
            let title = match flow.context.language.and_then(|l| l.hint()) {
                Some(hint) => format!("Submit {label} code. {hint}"),
                None => format!("Submit {label} code"),
            };
            (
                title,
                vec![
                    FormField::line("source", "Code")
                        .with_placeholder("Paste your code here")
                        .multiline(),
                ],
            )
        },
        Flow::CorrectStartDate => ("Correct Start Date".to_owned(), vec![date()]),
        Flow::Survey => (SURVEY_TITLE.to_owned(), survey_fields()),
        other => (other.as_str().to_owned(), Vec::new()),
    }
}

async fn confirm_text(state: &AppState, flow: &FlowSession) -> Result<String, ServiceError> {
    let selections = &flow.nav.selections;
    match flow.nav.flow() {
        Flow::LinkChannel => {
            let pending = flow.context.pending_relink.as_ref().ok_or_else(|| missing("relink"))?;
            Ok(format!(
                "The channel ID {} is already linked to path {}. Do you want to link it to the new path?",
                pending.requested.channel_id, pending.current_path
            ))
        },
        Flow::DeleteTask => {
            let task = state.curriculum.get_task(selected(selections.task_id.as_deref(), "task")?).await?;
            Ok(format!("Are you sure you want to delete task \"{}\"?", task.name))
        },
        Flow::DeleteTopic => {
            let topic_id = selected(selections.topic_id.as_deref(), "topic")?;
            let topic = state.curriculum.get_topic(topic_id).await?;
            Ok(format!("Are you sure you want to delete topic \"{}\" and all its tasks?", topic.name))
        },
        Flow::DeletePath => {
            let path = state.curriculum.get_path(selected(selections.path_id.as_deref(), "path")?).await?;
            Ok(format!(
                "Are you sure you want to delete path \"{}\" with all its topics, tasks and channel links?",
                path.name
            ))
        },
        other => Err(ServiceError::Validation(format!("{} has nothing to confirm", other.as_str()))),
    }
}

fn linked_text(binding: &ChannelBinding) -> String {
    format!(
        "Channel {} linked to path \"{}\" starting on {}.",
        binding.channel_id, binding.path_name, binding.start_date
    )
}

fn selected<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, ServiceError> {
    value.ok_or_else(|| missing(what))
}

fn missing(what: &str) -> ServiceError {
    ServiceError::Validation(format!("no {what} selected yet"))
}

#[cfg(test)]
mod tests {
    use pathbot_runner::Language;

    use super::*;

    fn code_form(language: Language) -> (String, Vec<FormField>) {
        let context = FlowContext { language: Some(language), ..FlowContext::default() };
        form(&FlowSession::new(NavState::new(Flow::SubmitCode), context))
    }

    #[test]
    fn java_form_carries_class_name_hint() {
        let (title, fields) = code_form(Language::Java);
        assert_eq!(title, "Submit Java code. Please use 'Main' as the class name for Java.");
        assert_eq!(fields.len(), 1);
        assert!(fields[0].multiline);
    }

    #[test]
    fn code_form_uses_language_label() {
        assert_eq!(code_form(Language::Cpp).0, "Submit C++ code");
    }

    #[test]
    fn survey_form_has_multiline_suggestions() {
        let fields = survey_fields();
        assert_eq!(fields.len(), 5);
        assert!(fields.iter().filter(|f| f.multiline).all(|f| f.name == "suggestions"));
    }
}
