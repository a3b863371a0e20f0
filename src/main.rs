mod auth;
mod config;
mod error;
mod models;
mod seed;
mod stats;
mod storage;
mod store;
mod tui;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use models::{ApplicationStatus, JobStatus, JobType, SalaryRange, UserRole};
use storage::{LocalStorage, MemoryStorage, SqliteStorage};
use store::{DataStore, JobDraft, JobFilters};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Job board - browse listings, apply, and manage postings")]
struct Cli {
    /// Path to the storage file (overrides JOBBOARD_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email and password
    Login {
        email: String,
        password: String,
    },

    /// Log out of the current session
    Logout,

    /// Create an account and log in
    Register {
        name: String,
        email: String,
        password: String,

        /// Account role (job_seeker, employer)
        #[arg(short, long, default_value = "job_seeker")]
        role: String,

        /// Company id for employer accounts
        #[arg(short, long)]
        company: Option<String>,
    },

    /// Show the logged in user
    Whoami,

    /// Browse and manage job listings
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Apply to a job
    Apply {
        job_id: String,

        #[arg(short, long)]
        cover_letter: Option<String>,
    },

    /// Withdraw one of your applications
    Withdraw {
        application_id: String,
    },

    /// List your applications
    Applications,

    /// Bookmark a job
    Save {
        job_id: String,
    },

    /// Remove a bookmark
    Unsave {
        job_id: String,
    },

    /// List your saved jobs
    Saved,

    /// Update an application as an employer
    Review {
        application_id: String,

        /// New status (new, reviewed, shortlisted, interview_scheduled,
        /// interviewed, offered, hired, rejected, withdrawn)
        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Company profiles
    Companies {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Dashboard numbers for the logged in user
    Stats,

    /// Manage user accounts (admin)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Browse jobs interactively
    Browse {
        /// Text to search for
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Restore the mock data and clear all user data
    Reset,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Job type (full-time, part-time, contract, remote)
    #[arg(short = 't', long = "type")]
    job_type: Option<String>,

    /// Location substring
    #[arg(short, long)]
    location: Option<String>,

    /// Company id
    #[arg(short, long)]
    company: Option<String>,
}

impl FilterArgs {
    fn into_filters(self) -> Result<JobFilters> {
        Ok(JobFilters {
            job_type: self.job_type.as_deref().map(str::parse::<JobType>).transpose()?,
            location: self.location,
            company_id: self.company,
        })
    }
}

#[derive(Subcommand)]
enum JobCommands {
    /// Search job listings
    List {
        /// Text to search for in title, company, description and tags
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show job details
    Show {
        id: String,
    },

    /// Post a job for your company
    Post {
        title: String,

        #[arg(short, long)]
        location: String,

        /// Job type (full-time, part-time, contract, remote)
        #[arg(short = 't', long = "type", default_value = "full-time")]
        job_type: String,

        #[arg(short, long)]
        description: String,

        #[arg(long)]
        salary_min: Option<i64>,

        #[arg(long)]
        salary_max: Option<i64>,

        /// Requirement line, repeatable
        #[arg(long = "requirement")]
        requirements: Vec<String>,

        /// Tag, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        department: Option<String>,

        /// Save as draft instead of publishing
        #[arg(long)]
        draft: bool,
    },

    /// Change a job's status (active, paused, closed, draft)
    Status {
        id: String,
        status: String,
    },

    /// Delete a job
    Delete {
        id: String,
    },

    /// List applications received for a job
    Applicants {
        id: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show,

    /// Update profile fields
    Set {
        #[arg(long)]
        headline: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        summary: Option<String>,

        /// Skill to add, repeatable
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// List companies
    List,

    /// Show a company with its jobs, reviews and news
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all users
    List,

    /// Delete a user
    Delete {
        id: String,
    },
}

fn init_logging(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.db, cli.verbose)?;
    init_logging(&config.log_filter);

    let storage: Box<dyn LocalStorage> = if cli.in_memory {
        Box::new(MemoryStorage::new())
    } else {
        let storage = SqliteStorage::open(&config.db_path).with_context(|| {
            format!("Failed to open job board storage at {}", config.db_path.display())
        })?;
        debug!(path = ?storage.path(), "storage opened");
        Box::new(storage)
    };
    let mut store = DataStore::open(storage);

    match cli.command {
        Commands::Login { email, password } => {
            let user = store.login(&email, &password)?;
            println!("Logged in as {} ({})", user.name, user.role);
        }

        Commands::Logout => {
            store.logout();
            println!("Logged out.");
        }

        Commands::Register {
            name,
            email,
            password,
            role,
            company,
        } => {
            let role: UserRole = role.parse()?;
            let user = store.register(&name, &email, &password, role, company)?;
            println!("Registered {} as {} (ID: {})", user.email, user.role, user.id);
        }

        Commands::Whoami => match store.current_user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("Role: {}", user.role);
                if let Some(company_id) = &user.company_id {
                    println!("Company: {}", company_id);
                }
            }
            None => println!("Not logged in."),
        },

        Commands::Jobs { command } => match command {
            JobCommands::List { query, filters } => {
                let filters = filters.into_filters()?;
                let jobs = store.search_jobs(query.as_deref().unwrap_or(""), &filters);
                if jobs.is_empty() {
                    println!("No jobs found.");
                } else {
                    println!(
                        "{:<10} {:<8} {:<30} {:<16} {:<12} {:>14}",
                        "ID", "STATUS", "TITLE", "COMPANY", "TYPE", "SALARY"
                    );
                    println!("{}", "-".repeat(95));
                    for job in jobs {
                        let salary = job
                            .salary
                            .as_ref()
                            .map(|s| format!("${}k-${}k", s.min / 1000, s.max / 1000))
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<10} {:<8} {:<30} {:<16} {:<12} {:>14}",
                            truncate(&job.id, 10),
                            job.status,
                            truncate(&job.title, 28),
                            truncate(&job.company.name, 14),
                            job.job_type,
                            salary
                        );
                    }
                }
            }

            JobCommands::Show { id } => {
                store.record_job_view(&id);
                match store.get_job(&id) {
                    Some(job) => {
                        println!("Job {}", job.id);
                        println!("Title: {}", job.title);
                        println!("Company: {} ({})", job.company.name, job.company.id);
                        println!("Location: {}", job.location);
                        println!("Type: {}", job.job_type);
                        println!("Status: {}", job.status);
                        if let Some(salary) = &job.salary {
                            println!("Salary: {}", salary);
                        }
                        if let Some(department) = &job.department {
                            println!("Department: {}", department);
                        }
                        if !job.tags.is_empty() {
                            println!("Tags: {}", job.tags.join(", "));
                        }
                        println!("Applicants: {}", job.application_count);
                        println!("Views: {}", job.view_count);
                        println!("Posted: {}", job.posted_at.format("%Y-%m-%d"));
                        println!("\n{}", textwrap::fill(&job.description, 80));
                        print_list("Requirements", &job.requirements);
                        print_list("Responsibilities", &job.responsibilities);
                        print_list("Benefits", &job.benefits);
                        if store.has_applied(&job.id) {
                            println!("\nYou have applied to this job.");
                        } else if store.is_job_saved(&job.id) {
                            println!("\nSaved.");
                        }
                    }
                    None => {
                        println!("Job {} not found.", id);
                    }
                }
            }

            JobCommands::Post {
                title,
                location,
                job_type,
                description,
                salary_min,
                salary_max,
                requirements,
                tags,
                department,
                draft,
            } => {
                let salary = match (salary_min, salary_max) {
                    (Some(min), Some(max)) => Some(SalaryRange {
                        min: min.min(max),
                        max: min.max(max),
                        currency: "USD".to_string(),
                    }),
                    (Some(v), None) | (None, Some(v)) => Some(SalaryRange {
                        min: v,
                        max: v,
                        currency: "USD".to_string(),
                    }),
                    (None, None) => None,
                };
                let job = store.post_job(JobDraft {
                    title,
                    location,
                    job_type: job_type.parse::<JobType>()?,
                    salary,
                    description,
                    requirements,
                    tags,
                    department,
                    status: if draft { JobStatus::Draft } else { JobStatus::Active },
                })?;
                println!("Posted job {} ({})", job.id, job.status);
            }

            JobCommands::Status { id, status } => {
                let status: JobStatus = status.parse()?;
                store.update_job_status(&id, status)?;
                println!("Job {} is now {}.", id, status);
            }

            JobCommands::Delete { id } => {
                store.delete_job(&id)?;
                println!("Deleted job {}.", id);
            }

            JobCommands::Applicants { id } => {
                let job = store
                    .get_job(&id)
                    .ok_or_else(|| anyhow!("Job {} not found", id))?;
                println!("Applications for {} ({} total)", job.title, job.application_count);
                let applications = store.applications_for_job(&id)?;
                if applications.is_empty() {
                    println!("No applications yet.");
                } else {
                    println!("{:<28} {:<12} {:<20} {:<12} {:>6}", "ID", "USER", "STATUS", "APPLIED", "RATING");
                    println!("{}", "-".repeat(82));
                    for app in applications {
                        println!(
                            "{:<28} {:<12} {:<20} {:<12} {:>6}",
                            app.id,
                            truncate(&app.user_id, 12),
                            app.status,
                            app.applied_at.format("%Y-%m-%d"),
                            app.rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
                        );
                    }
                }
            }
        },

        Commands::Apply { job_id, cover_letter } => {
            if store.get_job(&job_id).is_none() {
                return Err(anyhow!("Job {} not found", job_id));
            }
            let app = store.apply_to_job(&job_id, cover_letter)?;
            println!("Applied to {} (application {})", job_id, app.id);
        }

        Commands::Withdraw { application_id } => {
            store.withdraw_application(&application_id)?;
            println!("Withdrew application {}.", application_id);
        }

        Commands::Applications => {
            if store.current_user().is_none() {
                return Err(error::StoreError::NotLoggedIn.into());
            }
            let applications = store.my_applications();
            if applications.is_empty() {
                println!("No applications.");
            } else {
                println!("{:<28} {:<20} {:<28} {:<16} {:<12}", "ID", "STATUS", "JOB", "COMPANY", "APPLIED");
                println!("{}", "-".repeat(108));
                for (app, job) in applications {
                    println!(
                        "{:<28} {:<20} {:<28} {:<16} {:<12}",
                        app.id,
                        status_label(app.status),
                        truncate(&job.title, 26),
                        truncate(&job.company.name, 14),
                        app.applied_at.format("%Y-%m-%d")
                    );
                }
            }
        }

        Commands::Save { job_id } => {
            if store.get_job(&job_id).is_none() {
                return Err(anyhow!("Job {} not found", job_id));
            }
            store.save_job(&job_id)?;
            println!("Saved {}.", job_id);
        }

        Commands::Unsave { job_id } => {
            store.unsave_job(&job_id)?;
            println!("Removed {} from saved jobs.", job_id);
        }

        Commands::Saved => {
            if store.current_user().is_none() {
                return Err(error::StoreError::NotLoggedIn.into());
            }
            let saved = store.saved_jobs();
            if saved.is_empty() {
                println!("No saved jobs.");
            } else {
                println!("{:<10} {:<30} {:<16} {:<12}", "JOB", "TITLE", "COMPANY", "SAVED");
                println!("{}", "-".repeat(70));
                for (entry, job) in saved {
                    println!(
                        "{:<10} {:<30} {:<16} {:<12}",
                        truncate(&job.id, 10),
                        truncate(&job.title, 28),
                        truncate(&job.company.name, 14),
                        entry.saved_at.format("%Y-%m-%d")
                    );
                }
            }
        }

        Commands::Review {
            application_id,
            status,
            notes,
            rating,
        } => {
            if status.is_none() && notes.is_none() && rating.is_none() {
                println!("Nothing to update. Use --status, --notes or --rating");
            } else {
                if let Some(status) = status {
                    let status: ApplicationStatus = status.parse()?;
                    store.update_application_status(&application_id, status)?;
                    println!("Application {} is now {}.", application_id, status);
                }
                if notes.is_some() || rating.is_some() {
                    store.add_application_notes(&application_id, notes, rating)?;
                    if let Some(app) = store.get_application(&application_id) {
                        let rating = app.rating.map(|r| format!("{}/5", r)).unwrap_or_else(|| "-".to_string());
                        println!("Updated {} (rating: {}).", application_id, rating);
                    }
                }
            }
        }

        Commands::Profile { command } => match command {
            ProfileCommands::Show => match store.profile() {
                Some(profile) => {
                    println!("{} <{}>", profile.name, profile.email);
                    if let Some(headline) = &profile.headline {
                        println!("{}", headline);
                    }
                    if let Some(location) = &profile.location {
                        println!("Location: {}", location);
                    }
                    if let Some(phone) = &profile.phone {
                        println!("Phone: {}", phone);
                    }
                    if !profile.skills.is_empty() {
                        let skills: Vec<&str> = profile.skills.iter().map(String::as_str).collect();
                        println!("Skills: {}", skills.join(", "));
                    }
                    if let Some(summary) = &profile.summary {
                        println!("\n{}", textwrap::fill(summary, 80));
                    }
                    for exp in &profile.experience {
                        println!(
                            "  {} at {} ({} - {})",
                            exp.title,
                            exp.company,
                            exp.start,
                            exp.end.as_deref().unwrap_or("present")
                        );
                    }
                    for edu in &profile.education {
                        println!("  {}, {}", edu.degree, edu.school);
                    }
                }
                None => println!("No profile found."),
            },

            ProfileCommands::Set {
                headline,
                location,
                phone,
                summary,
                skills,
            } => {
                let user = store.current_user().cloned().ok_or(error::StoreError::NotLoggedIn)?;
                let mut profile = store.profile().cloned().unwrap_or_else(|| models::UserProfile {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    ..Default::default()
                });
                if headline.is_some() {
                    profile.headline = headline;
                }
                if location.is_some() {
                    profile.location = location;
                }
                if phone.is_some() {
                    profile.phone = phone;
                }
                if summary.is_some() {
                    profile.summary = summary;
                }
                profile.skills.extend(skills.into_iter().map(|s| s.trim().to_lowercase()));
                store.update_profile(profile)?;
                println!("Profile updated.");
            }
        },

        Commands::Companies { command } => match command {
            CompanyCommands::List => {
                println!("{:<12} {:<20} {:<18} {:<10} {:>6}", "ID", "NAME", "INDUSTRY", "SIZE", "JOBS");
                println!("{}", "-".repeat(70));
                for company in store.companies() {
                    println!(
                        "{:<12} {:<20} {:<18} {:<10} {:>6}",
                        company.id,
                        truncate(&company.name, 18),
                        truncate(&company.industry, 16),
                        company.size,
                        store.jobs_for_company(&company.id).len()
                    );
                }
            }

            CompanyCommands::Show { id } => match store.get_company(&id) {
                Some(company) => {
                    println!("{} ({})", company.name, company.id);
                    println!("Industry: {}", company.industry);
                    println!("Size: {}", company.size);
                    println!("Location: {}", company.location);
                    if let Some(founded) = company.founded {
                        println!("Founded: {}", founded);
                    }
                    if let Some(website) = &company.website {
                        println!("Website: {}", website);
                    }
                    println!("\n{}", textwrap::fill(&company.description, 80));

                    let jobs = store.jobs_for_company(&company.id);
                    if !jobs.is_empty() {
                        println!("\nJobs ({}):", jobs.len());
                        for job in jobs {
                            println!("  {} - {} ({})", job.id, job.title, job.status);
                        }
                    }
                    if !company.reviews.is_empty() {
                        let avg = company.average_rating().unwrap_or_default();
                        println!("\nReviews ({:.1}/5):", avg);
                        for review in &company.reviews {
                            println!("  [{}/5] {} - {}", review.rating, review.title, review.author);
                        }
                    }
                    if !company.news.is_empty() {
                        println!("\nNews:");
                        for item in &company.news {
                            println!("  {} {}", item.date.format("%Y-%m-%d"), item.title);
                        }
                    }
                }
                None => {
                    println!("Company '{}' not found.", id);
                }
            },
        },

        Commands::Stats => {
            let user = store.current_user().cloned().ok_or(error::StoreError::NotLoggedIn)?;
            match user.role {
                UserRole::JobSeeker => {
                    let stats = store.job_seeker_stats()?;
                    println!("Applications:  {}", stats.total_applications);
                    println!("  Active:      {}", stats.active_applications);
                    println!("  Interviews:  {}", stats.interviews);
                    println!("  Offers:      {}", stats.offers);
                    println!("  Rejections:  {}", stats.rejections);
                    println!("Saved jobs:    {}", stats.saved_jobs);
                }
                UserRole::Employer => {
                    let company_id = user
                        .company_id
                        .as_deref()
                        .ok_or_else(|| anyhow!("Employer account has no company"))?;
                    let stats = store.employer_stats(company_id);
                    println!("Jobs:          {} ({} active)", stats.total_jobs, stats.active_jobs);
                    println!("Applications:  {}", stats.total_applications);
                    println!("  New:         {}", stats.new_applications);
                    println!("  Shortlisted: {}", stats.shortlisted);
                    println!("  Interviews:  {}", stats.interviews);
                    println!("  Hires:       {}", stats.hires);
                    println!("Job views:     {}", stats.total_views);
                }
                UserRole::Admin => {
                    let stats = store.admin_stats()?;
                    println!(
                        "Users:         {} job seekers, {} employers, {} admins",
                        stats.job_seekers, stats.employers, stats.admins
                    );
                    println!("Companies:     {}", stats.companies);
                    println!(
                        "Jobs:          {} active, {} paused, {} closed, {} draft",
                        stats.active_jobs, stats.paused_jobs, stats.closed_jobs, stats.draft_jobs
                    );
                    println!("Applications:  {}", stats.applications);
                }
            }
        }

        Commands::Users { command } => match command {
            UserCommands::List => {
                let users = store.list_users()?;
                println!("{:<26} {:<28} {:<20} {:<11} {:<10}", "ID", "EMAIL", "NAME", "ROLE", "COMPANY");
                println!("{}", "-".repeat(98));
                for user in users {
                    println!(
                        "{:<26} {:<28} {:<20} {:<11} {:<10}",
                        user.id,
                        truncate(&user.email, 26),
                        truncate(&user.name, 18),
                        user.role,
                        user.company_id.as_deref().unwrap_or("-")
                    );
                }
            }

            UserCommands::Delete { id } => {
                store.delete_user(&id)?;
                println!("Deleted user {}.", id);
            }
        },

        Commands::Browse { query, filters } => {
            let filters = filters.into_filters()?;
            tui::run_browse(&mut store, query.as_deref().unwrap_or(""), &filters)?;
        }

        Commands::Reset => {
            store.reset();
            println!("Job board reset to mock data ({} jobs).", store.jobs().len());
        }
    }

    Ok(())
}

/// Status with its pipeline position, e.g. `shortlisted (3/7)`.
fn status_label(status: ApplicationStatus) -> String {
    match status.stage() {
        Some(stage) => format!("{} ({}/{})", status, stage + 1, ApplicationStatus::PIPELINE.len()),
        None => status.to_string(),
    }
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}:", heading);
    for item in items {
        println!("  - {}", item);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
