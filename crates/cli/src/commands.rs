//! Subcommand implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use matric_client::api::auth::{OtpChannel, OtpMethod};
use matric_client::api::ApiClient;
use matric_client::file_manager::FileManager;
use matric_core::application::Application;
use matric_core::files::{mime_for_extension, FileCategory};
use matric_core::form::builder::admission_form;
use matric_core::form::{AdmissionForm, ValidationContext};
use matric_core::types::EntityId;

use crate::{Command, FilesCommand};

pub(crate) async fn run(command: Command, client: &ApiClient) -> anyhow::Result<()> {
    match command {
        Command::Login {
            profile_code,
            method,
            channel,
            receiver,
        } => login(client, &profile_code, method.into(), channel.into(), &receiver).await,
        Command::Logout => {
            client.logout()?;
            println!("Session cleared.");
            Ok(())
        }
        Command::Check { file } => check(&file),
        Command::Submit { file } => submit(client, &file).await,
        Command::Show { id } => show(client, id).await,
        Command::Files { command } => files(client, command).await,
    }
}

async fn login(
    client: &ApiClient,
    profile_code: &str,
    method: OtpMethod,
    channel: OtpChannel,
    receiver: &str,
) -> anyhow::Result<()> {
    client
        .send_otp(method, channel, receiver)
        .await
        .context("failed to request an OTP")?;

    print!("Enter the 6-digit code: ");
    std::io::stdout().flush()?;
    let mut code = String::new();
    std::io::stdin().read_line(&mut code)?;

    let session = client
        .login(profile_code, code.trim())
        .await
        .context("login failed")?;
    println!("Welcome, {} ({}).", session.full_name, session.profile_code);
    Ok(())
}

/// Load a draft application JSON file into a fresh form.
fn load_form(path: &Path) -> anyhow::Result<AdmissionForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let app: Application = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid draft application", path.display()))?;
    let mut form = admission_form();
    form.populate(&app)?;
    Ok(form)
}

/// Run the full validation pass, printing one line per violation.
fn validate(form: &AdmissionForm) -> anyhow::Result<()> {
    let report = form.validate(&ValidationContext::now());
    if report.is_valid {
        return Ok(());
    }
    for violation in &report.violations {
        eprintln!("  {}: {}", violation.field, violation.message);
    }
    bail!("{} validation problem(s) found", report.violations.len());
}

fn check(path: &Path) -> anyhow::Result<()> {
    let form = load_form(path)?;
    validate(&form)?;
    println!("{} is valid.", path.display());
    Ok(())
}

async fn submit(client: &ApiClient, path: &Path) -> anyhow::Result<()> {
    let mut form = load_form(path)?;
    validate(&form)?;
    let receipt = client
        .submit_application(&mut form, &[])
        .await
        .context("submission failed")?;
    println!("Application submitted with id {}.", receipt.id);
    Ok(())
}

async fn show(client: &ApiClient, id: EntityId) -> anyhow::Result<()> {
    let app = client
        .application_detail(id)
        .await
        .context("failed to fetch the application")?;
    let p = &app.personal;

    println!("Application {id}");
    println!("  Name:     {}", p.full_name);
    println!("  Born:     {}", p.date_of_birth);
    if let Some(gender) = p.gender {
        println!("  Gender:   {}", gender.label());
    }
    println!("  Passport: {}", p.passport_number);
    println!("  Email:    {}", p.email);
    println!("  Mobile:   {}", p.mobile);
    println!("  Program:  {}", app.program.program);

    // The view page needs both ward names; fetch them together.
    if !p.correspondence.ward_id.is_empty() && !p.permanent.ward_id.is_empty() {
        let (correspondence, permanent) = client
            .resolve_addresses(&p.correspondence.ward_id, &p.permanent.ward_id)
            .await
            .context("failed to resolve address names")?;
        println!(
            "  Correspondence: {}, {}, {}",
            p.correspondence.street, correspondence.name, correspondence.province_name
        );
        println!(
            "  Permanent:      {}, {}, {}",
            p.permanent.street, permanent.name, permanent.province_name
        );
    }

    for (i, record) in app.education.undergraduates.iter().enumerate() {
        if !record.university.is_empty() {
            println!(
                "  Undergraduate[{i}]: {} -- {} ({})",
                record.university, record.major, record.graduation_year
            );
        }
    }
    for (i, record) in app.education.postgraduates.iter().enumerate() {
        if !record.university.is_empty() {
            println!(
                "  Postgraduate[{i}]:  {} -- {} ({})",
                record.university, record.major, record.graduation_year
            );
        }
    }
    Ok(())
}

async fn files(client: &ApiClient, command: FilesCommand) -> anyhow::Result<()> {
    match command {
        FilesCommand::List { category, entity } => {
            let category = FileCategory::from_code(category)?;
            let listed = client.list_files(category, entity).await?;
            if listed.is_empty() {
                println!("No attachments.");
            }
            for file in listed {
                println!(
                    "  {}  {:>9} bytes  {}  ({})",
                    file.file_name, file.size, file.content_type, file.local_name
                );
            }
            Ok(())
        }
        FilesCommand::Upload {
            category,
            entity,
            paths,
        } => {
            let category = FileCategory::from_code(category)?;
            let mut manager = FileManager::open(client, category, entity).await?;
            for path in &paths {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("attachment");
                let Some(mime) = mime_for_extension(name) else {
                    eprintln!("  skipped {name}: unsupported file type");
                    continue;
                };
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                if let Err(rejection) = manager.add(name, mime, bytes) {
                    eprintln!("  skipped: {rejection}");
                }
            }
            let saved = manager.save(client).await.context("upload failed")?;
            println!("Uploaded {saved} file(s).");
            Ok(())
        }
        FilesCommand::Delete {
            category,
            entity,
            local_name,
        } => {
            let category = FileCategory::from_code(category)?;
            let mut manager = FileManager::open(client, category, entity).await?;
            manager
                .remove(client, &local_name)
                .await
                .context("delete failed")?;
            println!("Deleted {local_name}.");
            Ok(())
        }
        FilesCommand::Download {
            category,
            entity,
            file_name,
            out,
        } => {
            let category = FileCategory::from_code(category)?;
            let manager = FileManager::open(client, category, entity).await?;
            let file = manager
                .existing()
                .iter()
                .find(|f| f.file_name == file_name || f.local_name == file_name)
                .with_context(|| format!("no attachment named {file_name}"))?
                .clone();
            let bytes = manager
                .download(client, &file)
                .await
                .context("download failed")?;
            let target = out.unwrap_or_else(|| PathBuf::from(&file.file_name));
            std::fs::write(&target, bytes)
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("Saved {}.", target.display());
            Ok(())
        }
    }
}
