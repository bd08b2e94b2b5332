use anyhow::{Context, Result};
use edge_deploy_core::{DeployConfig, Error, FUNCTIONS, Outcome, Summary};
use edge_deploy_deployer::{ManagementClient, Progress, deploy_all};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

const RULE: &str = "==================================================";

/// Deploy every Edge Function and report the results
pub async fn run(functions_root: PathBuf) -> Result<ExitCode> {
    println!("🚀 Edge Functions Deployment");
    println!("{}", RULE);
    println!();

    let config = match DeployConfig::from_env() {
        Ok(config) => config.with_functions_root(functions_root),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            if matches!(e, Error::MissingEnv(_)) {
                eprintln!("   Set it in your environment before running edge-deploy");
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(project = %config.project_id, api = %config.api_url, "configuration resolved");

    println!("📍 Project: {}", config.project_id);
    println!("🌐 URL: {}", config.supabase_url);
    println!("📁 Functions: {}", config.functions_root.display());
    println!();

    let client = ManagementClient::new(&config).context("Failed to create API client")?;

    let summary = deploy_all(&client, &config.functions_root, &FUNCTIONS, print_progress).await;

    print_summary(&summary);

    if summary.all_deployed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Started(name) => {
            print!("📦 Deploying: {}... ", name);
        }
        Progress::Updating(_) => {
            print!("(updating)... ");
        }
        Progress::Finished(name, outcome) => match outcome {
            Outcome::Created => println!("✅ Deployed"),
            Outcome::Updated => println!("✅ Updated"),
            Outcome::Failed(reason) => {
                println!("❌");
                println!("   {}: {}", name, reason);
            }
        },
    }
    // Progress lines are partial until the outcome arrives
    io::stdout().flush().ok();
}

fn print_summary(summary: &Summary) {
    let total = summary.total();

    println!();
    println!("{}", RULE);
    println!("📊 Deployment Summary");
    println!("{}", RULE);
    println!("✅ Deployed: {}/{}", summary.deployed, total);
    println!("❌ Failed: {}/{}", summary.failed, total);
    println!();

    if summary.all_deployed() {
        println!("🎉 All Edge Functions deployed successfully!");
        println!();
        println!("Next steps:");
        println!("1. Configure CRON_SECRET in Supabase");
        println!("2. Set up Cron Job for cron-check-deadlines");
    } else {
        println!("⚠️  Some deployments failed. Check the errors above.");
    }
}
