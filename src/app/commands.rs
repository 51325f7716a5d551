//! Command handlers. Output goes to the supplied writer.

use super::cli::{Command, StatsAction};
use super::context::AppContext;
use crate::assistant::{summarize_file, ChatSession, ChatTurn};
use crate::auth::{AccountRegistry, SessionFile};
use crate::dashboard;
use crate::stats::{IncrementOutcome, LoadOutcome, StatKind, StoreState};
use anyhow::{Context, Result};
use chrono::Timelike;
use std::io::Write;

pub fn describe_load(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Loaded => "Stats loaded".to_string(),
        LoadOutcome::Provisioned => "Started a new stats record".to_string(),
        LoadOutcome::Offline => "Offline: showing last known stats".to_string(),
        LoadOutcome::Failed { reason } => format!("Could not load stats: {}", reason),
        LoadOutcome::NoPrincipal => "Not signed in".to_string(),
    }
}

pub fn describe_increment(kind: StatKind, outcome: &IncrementOutcome) -> String {
    match outcome {
        IncrementOutcome::Confirmed { value } => format!("{}: {}", kind.label(), value),
        IncrementOutcome::RolledBack { value, error } => {
            format!("{}: {} (not saved: {})", kind.label(), value, error)
        }
        IncrementOutcome::NoPrincipal => format!("Not signed in; {} unchanged", kind.label()),
    }
}

fn write_stats(out: &mut dyn Write, state: &StoreState) -> Result<()> {
    for kind in StatKind::ALL {
        writeln!(out, "{}: {}", kind.label(), state.stats.get(kind))?;
    }
    if !state.is_online {
        writeln!(out, "(offline)")?;
    }
    Ok(())
}

/// Initializes the store for the signed-in principal, or fails if nobody is signed in.
async fn require_loaded(ctx: &AppContext) -> Result<&SessionFile> {
    let Some(session) = ctx.session.as_ref() else {
        anyhow::bail!("Not signed in. Run `study signin` first.");
    };
    let outcome = ctx.store.initialize_stats().await;
    tracing::debug!(?outcome, "stats initialized");
    Ok(session)
}

pub async fn run(ctx: &mut AppContext, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Signup {
            email,
            password,
            confirm,
            name,
        } => signup(ctx, &email, &password, &confirm, name.as_deref(), out).await,
        Command::Signin { email, password } => signin(ctx, &email, &password, out).await,
        Command::Signout => signout(ctx, out),
        Command::Whoami => whoami(ctx, out),
        Command::Stats { action } => stats(ctx, action, out).await,
        Command::Probe => probe(ctx, out).await,
        Command::Summarize { file } => {
            require_loaded(ctx).await?;
            let result =
                summarize_file(ctx.assistant.as_ref(), &ctx.store, &ctx.config.upload, &file)
                    .await;
            ctx.events.log_api_call("summarize", result.is_ok());
            let report = result?;
            writeln!(out, "Summary of {} ({}):", report.file_name, report.size_label)?;
            writeln!(out)?;
            writeln!(out, "{}", report.summary)?;
            writeln!(out)?;
            writeln!(
                out,
                "{}",
                describe_increment(StatKind::DocumentsProcessed, &report.stats)
            )?;
            Ok(())
        }
        Command::Chat { message } => {
            require_loaded(ctx).await?;
            let mut chat = ChatSession::new(
                ctx.assistant.clone(),
                ctx.store.clone(),
                ctx.config.chat.history_limit,
            );
            let turn = chat.send(&message.join(" ")).await?;
            ctx.events
                .log_api_call("chat", matches!(turn, ChatTurn::Answered { .. }));
            match turn {
                ChatTurn::Answered {
                    reply,
                    model,
                    stats,
                } => {
                    writeln!(out, "{}", reply)?;
                    if let Some(model) = model {
                        writeln!(out, "(model: {})", model)?;
                    }
                    writeln!(
                        out,
                        "{}",
                        describe_increment(StatKind::QuestionsAsked, &stats)
                    )?;
                    Ok(())
                }
                ChatTurn::Failed { error } => anyhow::bail!(error),
            }
        }
        Command::Dashboard => {
            let session = require_loaded(ctx).await?;
            let name = dashboard::display_name(session.display_name.as_deref(), &session.email);
            let hour = chrono::Local::now().hour();
            writeln!(out, "{}", dashboard::render(&name, hour, &ctx.store.snapshot()))?;
            Ok(())
        }
    }
}

async fn signup(
    ctx: &mut AppContext,
    email: &str,
    password: &str,
    confirm: &str,
    name: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut registry = AccountRegistry::load(&ctx.paths.accounts)?;
    let account = registry.sign_up(email, password, confirm, name)?;
    registry.save()?;

    let session = SessionFile::for_account(&account);
    session.write(&ctx.paths.session)?;
    ctx.gate.sign_in(session.principal()?);

    let outcome = ctx.store.initialize_stats().await;
    let display = dashboard::display_name(session.display_name.as_deref(), &session.email);
    ctx.session = Some(session);

    writeln!(out, "Account created. Welcome, {}!", display)?;
    writeln!(out, "{}", describe_load(&outcome))?;
    Ok(())
}

/// Starts initialization before the sign-in so the store picks up the new principal.
async fn signin(
    ctx: &mut AppContext,
    email: &str,
    password: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let registry = AccountRegistry::load(&ctx.paths.accounts)?;

    ctx.gate.sign_out();
    let store = ctx.store.clone();
    let pending = tokio::spawn(async move { store.initialize_stats().await });

    let account = match registry.sign_in(email, password) {
        Ok(account) => account.clone(),
        Err(e) => {
            pending.abort();
            return Err(e);
        }
    };

    let session = SessionFile::for_account(&account);
    session.write(&ctx.paths.session)?;
    ctx.gate.sign_in(session.principal()?);

    let outcome = pending
        .await
        .context("Stats initialization task failed")?;
    let display = dashboard::display_name(session.display_name.as_deref(), &session.email);
    ctx.session = Some(session);

    writeln!(out, "Signed in as {}", display)?;
    writeln!(out, "{}", describe_load(&outcome))?;
    Ok(())
}

fn signout(ctx: &mut AppContext, out: &mut dyn Write) -> Result<()> {
    let was_signed_in = SessionFile::clear(&ctx.paths.session)?;
    ctx.gate.sign_out();
    ctx.session = None;
    if was_signed_in {
        writeln!(out, "Signed out")?;
    } else {
        writeln!(out, "Not signed in")?;
    }
    Ok(())
}

fn whoami(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    match &ctx.session {
        Some(session) => {
            let name = dashboard::display_name(session.display_name.as_deref(), &session.email);
            writeln!(out, "{} <{}>", name, session.email)?;
            writeln!(out, "uid: {}", session.uid)?;
            writeln!(
                out,
                "signed in: {}",
                session.signed_in_at.0.format("%Y-%m-%d %H:%M UTC")
            )?;
        }
        None => writeln!(out, "Not signed in")?,
    }
    Ok(())
}

async fn stats(ctx: &AppContext, action: StatsAction, out: &mut dyn Write) -> Result<()> {
    require_loaded(ctx).await?;
    match action {
        StatsAction::Show { json } => {
            let state = ctx.store.snapshot();
            if json {
                let rendered = serde_json::to_string_pretty(&state)
                    .context("Failed to serialize stats")?;
                writeln!(out, "{}", rendered)?;
            } else {
                write_stats(out, &state)?;
            }
        }
        StatsAction::Refresh => {
            let outcome = ctx.store.refresh_stats().await;
            writeln!(out, "{}", describe_load(&outcome))?;
            write_stats(out, &ctx.store.snapshot())?;
        }
        StatsAction::Increment { stat } => {
            let kind: StatKind = stat.parse()?;
            let outcome = ctx.store.increment_stat(kind).await;
            writeln!(out, "{}", describe_increment(kind, &outcome))?;
        }
    }
    Ok(())
}

async fn probe(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    if ctx.session.is_some() {
        ctx.store.initialize_stats().await;
    }
    let online = ctx.store.check_network_status().await;
    writeln!(
        out,
        "Stats backend: {}",
        if online { "online" } else { "offline" }
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
