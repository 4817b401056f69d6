use std::{collections::BTreeMap, env, process};

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use portal_wizard::{
    config::ConfigManager,
    form::{AccessGrantEntry, AccessLevel, FormPatch, IssueCategory, RequestKind, StorageTier},
    init,
    submit::ReporterIdentity,
    utils::build_info,
    verify::Verification,
    wizard::{Flow, StepId},
    WizardError, WizardSession,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    init();

    if let Err(err) = run().await {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: portal_wizard_cli [request|issue|--version]");
}

async fn run() -> CliResult<()> {
    let flow = match env::args().nth(1).as_deref() {
        None | Some("request") => Flow::Request,
        Some("issue") => Flow::IssueReport,
        Some("--version") => {
            println!("{}", build_info::current().summary());
            return Ok(());
        }
        Some(other) => {
            print_usage();
            return Err(format!("unknown command `{other}`").into());
        }
    };

    let config = ConfigManager::from_env()?.load()?;
    let theme = ColorfulTheme::default();
    let reporter = match config.reporter.clone() {
        Some(reporter) => reporter,
        None => prompt_reporter(&theme)?,
    };
    let mut session = WizardSession::connect(flow, &config)?;

    while session.current_step() != StepId::Success {
        let view = session.view();
        println!();
        println!(
            "{}",
            format!("{} · step {} · {}", flow.label(), view.step_number, view.title).bold()
        );

        if view.step == StepId::Confirmation {
            if !confirm_and_submit(&mut session, &theme, &reporter).await? {
                session.go_back();
            }
            continue;
        }

        capture_step(&mut session, view.step, &theme).await?;

        let choice = Select::with_theme(&theme)
            .with_prompt("Next")
            .items(&["Continue", "Back", "Quit"])
            .default(0)
            .interact()?;
        match choice {
            0 => {
                if !session.go_next() {
                    let validation = session.controller().validate_current();
                    if !validation.missing.is_empty() {
                        println!("{} {}", "Missing:".yellow(), validation.describe_missing());
                    }
                    if validation.verification == Some(Verification::Invalid) {
                        println!("{}", "The AWS account could not be verified.".yellow());
                    }
                }
            }
            1 => {
                session.go_back();
            }
            _ => return Ok(()),
        }
    }

    Ok(())
}

fn prompt_reporter(theme: &ColorfulTheme) -> CliResult<ReporterIdentity> {
    let name: String = Input::with_theme(theme).with_prompt("Your name").interact_text()?;
    let email: String = Input::with_theme(theme).with_prompt("Your email").interact_text()?;
    Ok(ReporterIdentity::new(name, email))
}

fn prompt_optional(theme: &ColorfulTheme, prompt: &str) -> CliResult<String> {
    Ok(Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

fn prompt_required(theme: &ColorfulTheme, prompt: &str) -> CliResult<String> {
    Ok(Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|input: &String| require_text(input))
        .interact_text()?)
}

/// Replacement grant list; every row has a name and an email.
fn prompt_access_grants(theme: &ColorfulTheme) -> CliResult<Vec<AccessGrantEntry>> {
    let labels: Vec<&str> = AccessLevel::ALL.iter().map(|level| level.label()).collect();
    let mut rows = Vec::new();
    loop {
        let name = prompt_required(theme, "Grantee name")?;
        let email = prompt_required(theme, "Grantee email")?;
        let level = AccessLevel::ALL[select_index(theme, "Access level", &labels)?];
        rows.push(AccessGrantEntry::new(name, email, level));
        let more = Confirm::with_theme(theme)
            .with_prompt("Add another person?")
            .default(false)
            .interact()?;
        if !more {
            return Ok(rows);
        }
    }
}

fn require_text(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        Err("This field is required".into())
    } else {
        Ok(())
    }
}

fn parse_optional_days(input: &str) -> Result<Option<u32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| format!("`{trimmed}` is not a whole number of days"))
}

fn select_index(theme: &ColorfulTheme, prompt: &str, labels: &[&str]) -> CliResult<usize> {
    Ok(Select::with_theme(theme)
        .with_prompt(prompt)
        .items(labels)
        .default(0)
        .interact()?)
}

async fn capture_step(session: &mut WizardSession, step: StepId, theme: &ColorfulTheme) -> CliResult<()> {
    match step {
        StepId::RequestType => {
            let labels: Vec<&str> = RequestKind::ALL.iter().map(|kind| kind.label()).collect();
            let index = select_index(theme, "Request type", &labels)?;
            session.update(FormPatch {
                request_kind: Some(RequestKind::ALL[index]),
                ..Default::default()
            });
        }
        StepId::AccountSetup => {
            session.update(FormPatch {
                account_name: Some(prompt_optional(theme, "Account name")?),
                owner_name: Some(prompt_optional(theme, "Owner name")?),
                owner_email: Some(prompt_optional(theme, "Owner email")?),
                cost_center: Some(prompt_optional(theme, "Cost center (optional)")?),
                ..Default::default()
            });
        }
        StepId::AwsAccount => {
            let account_id = prompt_optional(theme, "AWS account ID")?;
            session.update(FormPatch {
                aws_account_id: Some(account_id),
                ..Default::default()
            });
            match session.settle_verification().await {
                Verification::Valid => println!("{}", "Account verified.".green()),
                Verification::Invalid => println!("{}", "Account not recognised.".red()),
                Verification::Unknown => {}
            }
        }
        StepId::AccessGrants => {
            let current = &session.controller().form().access_grants;
            if !current.is_empty() {
                for grant in current {
                    println!("  {} <{}> {}", grant.name, grant.email, grant.access_level.label());
                }
                let keep = current.iter().all(AccessGrantEntry::is_complete)
                    && Confirm::with_theme(theme)
                        .with_prompt("Keep this list?")
                        .default(true)
                        .interact()?;
                if keep {
                    return Ok(());
                }
            }
            let rows = prompt_access_grants(theme)?;
            session.update(FormPatch {
                access_grants: Some(rows),
                ..Default::default()
            });
        }
        StepId::StorageTier => {
            let labels: Vec<&str> = StorageTier::ALL.iter().map(|tier| tier.label()).collect();
            let tier = StorageTier::ALL[select_index(theme, "Storage tier", &labels)?];
            let primary = prompt_optional(theme, "Primary bucket name")?;
            let extra = prompt_optional(theme, "Additional buckets (comma separated)")?;
            let mut slots = BTreeMap::new();
            slots.insert("primary".to_string(), primary);
            session.update(FormPatch {
                storage_tier: Some(tier),
                bucket_slots: Some(slots),
                bucket_notes: Some(extra.split(',').collect::<Vec<_>>().join("\n")),
                ..Default::default()
            });
        }
        StepId::Lifecycle => {
            let retention: u32 = Input::with_theme(theme)
                .with_prompt("Retention (days)")
                .default(90)
                .interact_text()?;
            let archive: String = Input::with_theme(theme)
                .with_prompt("Archive after (days, optional)")
                .allow_empty(true)
                .validate_with(|input: &String| parse_optional_days(input).map(|_| ()))
                .interact_text()?;
            let versioning = Confirm::with_theme(theme)
                .with_prompt("Enable versioning?")
                .default(true)
                .interact()?;
            session.update(FormPatch {
                retention_days: Some(Some(retention)),
                archive_after_days: Some(parse_optional_days(&archive)?),
                versioning: Some(versioning),
                ..Default::default()
            });
        }
        StepId::ChangeRequest => {
            session.update(FormPatch {
                change_details: Some(prompt_optional(theme, "Describe the change")?),
                ..Default::default()
            });
        }
        StepId::IssueCategory => {
            let labels: Vec<&str> = IssueCategory::ALL.iter().map(|c| c.label()).collect();
            let index = select_index(theme, "Issue category", &labels)?;
            session.update(FormPatch {
                issue_category: Some(IssueCategory::ALL[index]),
                ..Default::default()
            });
        }
        StepId::IssueDetails => {
            let description = prompt_optional(theme, "What happened?")?;
            let attachment = prompt_optional(theme, "Attachment reference (optional)")?;
            session.update(FormPatch {
                issue_description: Some(description),
                attachment_ref: Some((!attachment.trim().is_empty()).then_some(attachment)),
                ..Default::default()
            });
        }
        StepId::Confirmation | StepId::Success => {}
    }
    Ok(())
}

/// Returns `false` when the user wants to go back and edit.
async fn confirm_and_submit(
    session: &mut WizardSession,
    theme: &ColorfulTheme,
    reporter: &ReporterIdentity,
) -> CliResult<bool> {
    println!("{}", serde_json::to_string_pretty(&session.view().form)?);
    for ack in session.controller().flow().checklist() {
        let checked = Confirm::with_theme(theme)
            .with_prompt(ack.label())
            .default(false)
            .interact()?;
        session.set_acknowledgement(*ack, checked);
    }

    loop {
        let choice = select_index(theme, "Ready?", &["Submit", "Back"])?;
        if choice == 1 {
            return Ok(false);
        }
        match session.submit(reporter).await {
            Ok(receipt) => {
                println!("{} ticket {}", "Submitted:".green().bold(), receipt.ticket_id);
                return Ok(true);
            }
            Err(WizardError::StepIncomplete { step, missing }) => {
                println!("{} {step}: {missing}", "Not ready:".yellow().bold());
                if step != StepId::Confirmation {
                    session.jump_to_step(step);
                }
                return Ok(true);
            }
            Err(err) => {
                println!("{} {err}", "Submission failed:".red().bold());
            }
        }
    }
}
