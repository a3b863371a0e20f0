//! Dashboard numbers. Everything here is recomputed from the current
//! collections on every call.

use serde::Serialize;

use crate::models::{Application, ApplicationStatus, Company, Job, JobStatus, SavedJob, User, UserRole};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobSeekerStats {
    pub total_applications: usize,
    pub active_applications: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejections: usize,
    pub saved_jobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployerStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: usize,
    pub new_applications: usize,
    pub shortlisted: usize,
    pub interviews: usize,
    pub hires: usize,
    pub total_views: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub job_seekers: usize,
    pub employers: usize,
    pub admins: usize,
    pub companies: usize,
    pub active_jobs: usize,
    pub paused_jobs: usize,
    pub closed_jobs: usize,
    pub draft_jobs: usize,
    pub applications: usize,
}

fn is_interview(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::InterviewScheduled | ApplicationStatus::Interviewed
    )
}

pub fn job_seeker_stats(user_id: &str, applications: &[Application], saved_jobs: &[SavedJob]) -> JobSeekerStats {
    let mine: Vec<&Application> = applications.iter().filter(|a| a.user_id == user_id).collect();

    JobSeekerStats {
        total_applications: mine.len(),
        active_applications: mine.iter().filter(|a| !a.status.is_terminal()).count(),
        interviews: mine.iter().filter(|a| is_interview(a.status)).count(),
        offers: mine
            .iter()
            .filter(|a| matches!(a.status, ApplicationStatus::Offered | ApplicationStatus::Hired))
            .count(),
        rejections: mine
            .iter()
            .filter(|a| a.status == ApplicationStatus::Rejected)
            .count(),
        saved_jobs: saved_jobs.iter().filter(|s| s.user_id == user_id).count(),
    }
}

pub fn employer_stats(company_id: &str, jobs: &[Job], applications: &[Application]) -> EmployerStats {
    let company_jobs: Vec<&Job> = jobs.iter().filter(|j| j.company.id == company_id).collect();
    let received: Vec<&Application> = applications
        .iter()
        .filter(|a| company_jobs.iter().any(|j| j.id == a.job_id))
        .filter(|a| a.status != ApplicationStatus::Withdrawn)
        .collect();

    let count = |status: ApplicationStatus| received.iter().filter(|a| a.status == status).count();

    EmployerStats {
        total_jobs: company_jobs.len(),
        active_jobs: company_jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active)
            .count(),
        total_applications: received.len(),
        new_applications: count(ApplicationStatus::New),
        shortlisted: count(ApplicationStatus::Shortlisted),
        interviews: received.iter().filter(|a| is_interview(a.status)).count(),
        hires: count(ApplicationStatus::Hired),
        total_views: company_jobs.iter().map(|j| j.view_count as u64).sum(),
    }
}

pub fn admin_stats(users: &[User], companies: &[Company], jobs: &[Job], applications: &[Application]) -> AdminStats {
    let role = |r: UserRole| users.iter().filter(|u| u.role == r).count();
    let status = |s: JobStatus| jobs.iter().filter(|j| j.status == s).count();

    AdminStats {
        job_seekers: role(UserRole::JobSeeker),
        employers: role(UserRole::Employer),
        admins: role(UserRole::Admin),
        companies: companies.len(),
        active_jobs: status(JobStatus::Active),
        paused_jobs: status(JobStatus::Paused),
        closed_jobs: status(JobStatus::Closed),
        draft_jobs: status(JobStatus::Draft),
        applications: applications.len(),
    }
}
