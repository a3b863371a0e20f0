use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::{
    new_id, Application, ApplicationStatus, Company, Job, JobStatus, JobType, SalaryRange,
    SavedJob, User, UserProfile, UserRole,
};
use crate::seed;
use crate::stats::{self, EmployerStats, JobSeekerStats};
use crate::storage::{
    read_json, write_json, LocalStorage, APPLICATIONS_KEY, JOBS_KEY, SAVED_JOBS_KEY,
    USER_PROFILES_KEY, USERS_KEY,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Exact-match filters applied after the text query.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub job_type: Option<JobType>,
    /// Case-insensitive substring of the job location.
    pub location: Option<String>,
    pub company_id: Option<String>,
}

/// Fields an employer supplies when posting a job.
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub title: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: Option<SalaryRange>,
    pub description: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub department: Option<String>,
    pub status: JobStatus,
}

/// In-memory job board state. Every mutation re-serializes the touched
/// collection into local storage.
pub struct DataStore {
    pub(crate) storage: Box<dyn LocalStorage>,
    pub(crate) jobs: Vec<Job>,
    pub(crate) companies: Vec<Company>,
    pub(crate) applications: Vec<Application>,
    pub(crate) saved_jobs: Vec<SavedJob>,
    pub(crate) profiles: Vec<UserProfile>,
    pub(crate) users: Vec<User>,
    pub(crate) current_user: Option<User>,
}

/// Reads a collection, falling back to `default` when the key is missing
/// or holds something unreadable.
fn load_or<T: DeserializeOwned>(
    storage: &dyn LocalStorage,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    match read_json(storage, key) {
        Ok(Some(value)) => {
            debug!(key, "loaded from storage");
            value
        }
        Ok(None) => default(),
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable stored value");
            default()
        }
    }
}

/// Best-effort write: failures are logged, never returned.
pub(crate) fn persist<T: Serialize + ?Sized>(storage: &mut dyn LocalStorage, key: &str, value: &T) {
    if let Err(e) = write_json(storage, key, value) {
        warn!(key, error = %e, "failed to persist");
    }
}

impl DataStore {
    pub fn open(storage: Box<dyn LocalStorage>) -> Self {
        let companies = seed::companies();
        let jobs = load_or(storage.as_ref(), JOBS_KEY, || seed::jobs(&companies));
        let applications = load_or(storage.as_ref(), APPLICATIONS_KEY, Vec::new);
        let saved_jobs = load_or(storage.as_ref(), SAVED_JOBS_KEY, Vec::new);
        let profiles = load_or(storage.as_ref(), USER_PROFILES_KEY, seed::profiles);
        let users = load_or(storage.as_ref(), USERS_KEY, seed::users);

        let mut store = Self {
            storage,
            jobs,
            companies,
            applications,
            saved_jobs,
            profiles,
            users,
            current_user: None,
        };
        store.restore_session();
        debug!(
            jobs = store.jobs.len(),
            applications = store.applications.len(),
            saved = store.saved_jobs.len(),
            "data store opened"
        );
        store
    }

    /// Drops every stored key and reloads the seed data.
    pub fn reset(&mut self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear storage");
        }
        self.companies = seed::companies();
        self.jobs = seed::jobs(&self.companies);
        self.applications.clear();
        self.saved_jobs.clear();
        self.profiles = seed::profiles();
        self.users = seed::users();
        self.current_user = None;
        info!("data store reset to seed data");
    }

    /// Switches the active identity. Every user-scoped read and write
    /// goes through this user.
    pub fn set_current_user(&mut self, user: Option<User>) {
        debug!(user = user.as_ref().map(|u| u.id.as_str()), "current user changed");
        self.current_user = user;
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    fn require_user(&self) -> StoreResult<&User> {
        self.current_user.as_ref().ok_or(StoreError::NotLoggedIn)
    }

    fn require_user_id(&self) -> StoreResult<String> {
        self.require_user().map(|u| u.id.clone())
    }

    /// Employers may only touch their own company's jobs; admins may touch any.
    fn require_job_manager(&self, company_id: &str) -> StoreResult<()> {
        let user = self.require_user()?;
        match user.role {
            UserRole::Admin => Ok(()),
            UserRole::Employer if user.company_id.as_deref() == Some(company_id) => Ok(()),
            UserRole::Employer => Err(StoreError::Forbidden(
                "Employers can only manage their own company's jobs".to_string(),
            )),
            UserRole::JobSeeker => Err(StoreError::Forbidden(
                "Only employer accounts can manage jobs".to_string(),
            )),
        }
    }

    /// Reviewing an application needs the same rights as managing its job.
    fn require_application_manager(&self, application_id: &str) -> StoreResult<()> {
        let job_id = self
            .get_application(application_id)
            .map(|a| a.job_id.clone())
            .ok_or_else(|| StoreError::ApplicationNotFound(application_id.to_string()))?;
        let company_id = self
            .get_job(&job_id)
            .map(|j| j.company.id.clone())
            .ok_or(StoreError::JobNotFound(job_id))?;
        self.require_job_manager(&company_id)
    }

    // --- Jobs ---

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get_job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Case-insensitive substring match on title, company name,
    /// description and tags, then the exact filters. Keeps insertion order.
    pub fn search_jobs(&self, query: &str, filters: &JobFilters) -> Vec<&Job> {
        let query = query.trim().to_lowercase();
        let location = filters.location.as_ref().map(|l| l.to_lowercase());

        self.jobs
            .iter()
            .filter(|job| {
                query.is_empty()
                    || job.title.to_lowercase().contains(&query)
                    || job.company.name.to_lowercase().contains(&query)
                    || job.description.to_lowercase().contains(&query)
                    || job.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .filter(|job| filters.job_type.is_none_or(|t| job.job_type == t))
            .filter(|job| {
                location
                    .as_ref()
                    .is_none_or(|l| job.location.to_lowercase().contains(l))
            })
            .filter(|job| {
                filters
                    .company_id
                    .as_ref()
                    .is_none_or(|id| &job.company.id == id)
            })
            .collect()
    }

    pub fn record_job_view(&mut self, job_id: &str) {
        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) {
            job.view_count += 1;
            persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        }
    }

    pub fn post_job(&mut self, draft: JobDraft) -> StoreResult<Job> {
        let user = self.require_user()?;
        let company_id = match (user.role, &user.company_id) {
            (UserRole::Employer, Some(id)) => id.clone(),
            _ => {
                return Err(StoreError::Forbidden(
                    "Only employer accounts with a company can post jobs".to_string(),
                ))
            }
        };
        let company = self
            .companies
            .iter()
            .find(|c| c.id == company_id)
            .ok_or_else(|| StoreError::Forbidden(format!("Company {} does not exist", company_id)))?;

        let job = Job {
            id: new_id("job"),
            title: draft.title,
            company: company.profile(),
            location: draft.location,
            job_type: draft.job_type,
            salary: draft.salary,
            description: draft.description,
            requirements: draft.requirements,
            responsibilities: Vec::new(),
            benefits: Vec::new(),
            tags: draft.tags,
            department: draft.department,
            application_count: 0,
            view_count: 0,
            status: draft.status,
            posted_at: Utc::now(),
        };
        info!(job_id = %job.id, company = %company_id, "job posted");
        self.jobs.push(job.clone());
        persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        Ok(job)
    }

    pub fn update_job_status(&mut self, job_id: &str, status: JobStatus) -> StoreResult<()> {
        let company_id = self
            .get_job(job_id)
            .map(|j| j.company.id.clone())
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        self.require_job_manager(&company_id)?;

        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = status;
        }
        info!(job_id, status = %status, "job status updated");
        persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        Ok(())
    }

    /// Removes the job only. Its applications and saved-job rows stay and
    /// drop out of the joined views as orphans.
    pub fn delete_job(&mut self, job_id: &str) -> StoreResult<()> {
        let company_id = self
            .get_job(job_id)
            .map(|j| j.company.id.clone())
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        self.require_job_manager(&company_id)?;

        self.jobs.retain(|j| j.id != job_id);
        info!(job_id, "job deleted");
        persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        Ok(())
    }

    // --- Companies ---

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn get_company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn jobs_for_company(&self, company_id: &str) -> Vec<&Job> {
        self.jobs
            .iter()
            .filter(|j| j.company.id == company_id)
            .collect()
    }

    // --- Applications ---

    pub fn apply_to_job(&mut self, job_id: &str, cover_letter: Option<String>) -> StoreResult<Application> {
        let user_id = self.require_user_id()?;

        let already_applied = self.applications.iter().any(|a| {
            a.job_id == job_id && a.user_id == user_id && a.status != ApplicationStatus::Withdrawn
        });
        if already_applied {
            return Err(StoreError::AlreadyApplied);
        }

        let now = Utc::now();
        let application = Application {
            id: new_id("app"),
            job_id: job_id.to_string(),
            user_id,
            applied_at: now,
            status: ApplicationStatus::New,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
            notes: None,
            rating: None,
            last_updated: now,
        };
        self.applications.push(application.clone());

        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) {
            job.application_count += 1;
        }

        info!(application_id = %application.id, job_id, "applied to job");
        persist(self.storage.as_mut(), APPLICATIONS_KEY, &self.applications);
        persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        Ok(application)
    }

    /// Withdrawing an already withdrawn application changes nothing.
    pub fn withdraw_application(&mut self, application_id: &str) -> StoreResult<()> {
        let user_id = self.require_user_id()?;
        let application = self
            .applications
            .iter_mut()
            .find(|a| a.id == application_id && a.user_id == user_id)
            .ok_or_else(|| StoreError::ApplicationNotFound(application_id.to_string()))?;

        if application.status == ApplicationStatus::Withdrawn {
            debug!(application_id, "already withdrawn");
            return Ok(());
        }
        application.status = ApplicationStatus::Withdrawn;
        application.last_updated = Utc::now();
        let job_id = application.job_id.clone();

        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) {
            job.application_count = job.application_count.saturating_sub(1);
        }

        info!(application_id, job_id = %job_id, "application withdrawn");
        persist(self.storage.as_mut(), APPLICATIONS_KEY, &self.applications);
        persist(self.storage.as_mut(), JOBS_KEY, &self.jobs);
        Ok(())
    }

    /// Overwrites the status. Any transition is accepted, including
    /// moving backwards through the pipeline.
    pub fn update_application_status(
        &mut self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> StoreResult<()> {
        self.require_application_manager(application_id)?;
        let application = self
            .applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| StoreError::ApplicationNotFound(application_id.to_string()))?;

        let previous = application.status;
        application.status = status;
        application.last_updated = Utc::now();
        info!(application_id, from = %previous, to = %status, "application status updated");
        persist(self.storage.as_mut(), APPLICATIONS_KEY, &self.applications);
        Ok(())
    }

    pub fn add_application_notes(
        &mut self,
        application_id: &str,
        notes: Option<String>,
        rating: Option<u8>,
    ) -> StoreResult<()> {
        self.require_application_manager(application_id)?;
        let application = self
            .applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| StoreError::ApplicationNotFound(application_id.to_string()))?;

        if notes.is_some() {
            application.notes = notes;
        }
        if let Some(rating) = rating {
            application.rating = Some(rating.clamp(1, 5));
        }
        application.last_updated = Utc::now();
        persist(self.storage.as_mut(), APPLICATIONS_KEY, &self.applications);
        Ok(())
    }

    pub fn get_application(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    /// The current user's applications joined with their jobs, newest
    /// first. Applications whose job no longer exists are left out.
    pub fn my_applications(&self) -> Vec<(&Application, &Job)> {
        let Some(user) = self.current_user.as_ref() else {
            return Vec::new();
        };
        let mut joined: Vec<(&Application, &Job)> = self
            .applications
            .iter()
            .filter(|a| a.user_id == user.id)
            .filter_map(|a| self.get_job(&a.job_id).map(|j| (a, j)))
            .collect();
        joined.sort_by(|a, b| b.0.applied_at.cmp(&a.0.applied_at));
        joined
    }

    /// Applications received for a job, visible to its employer and admins.
    pub fn applications_for_job(&self, job_id: &str) -> StoreResult<Vec<&Application>> {
        let job = self
            .get_job(job_id)
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        self.require_job_manager(&job.company.id)?;
        Ok(self
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .collect())
    }

    pub fn has_applied(&self, job_id: &str) -> bool {
        let Some(user) = self.current_user.as_ref() else {
            return false;
        };
        self.applications.iter().any(|a| {
            a.job_id == job_id && a.user_id == user.id && a.status != ApplicationStatus::Withdrawn
        })
    }

    // --- Saved jobs ---

    pub fn save_job(&mut self, job_id: &str) -> StoreResult<()> {
        let user_id = self.require_user_id()?;
        if self.is_saved_by(&user_id, job_id) {
            debug!(job_id, "already saved");
            return Ok(());
        }
        self.saved_jobs.push(SavedJob {
            id: new_id("saved"),
            job_id: job_id.to_string(),
            user_id,
            saved_at: Utc::now(),
        });
        info!(job_id, "job saved");
        persist(self.storage.as_mut(), SAVED_JOBS_KEY, &self.saved_jobs);
        Ok(())
    }

    pub fn unsave_job(&mut self, job_id: &str) -> StoreResult<()> {
        let user_id = self.require_user_id()?;
        let before = self.saved_jobs.len();
        self.saved_jobs
            .retain(|s| !(s.job_id == job_id && s.user_id == user_id));
        if self.saved_jobs.len() != before {
            info!(job_id, "job unsaved");
            persist(self.storage.as_mut(), SAVED_JOBS_KEY, &self.saved_jobs);
        }
        Ok(())
    }

    pub fn is_job_saved(&self, job_id: &str) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| self.is_saved_by(&u.id, job_id))
    }

    fn is_saved_by(&self, user_id: &str, job_id: &str) -> bool {
        self.saved_jobs
            .iter()
            .any(|s| s.user_id == user_id && s.job_id == job_id)
    }

    /// The current user's saved jobs joined with their jobs, orphans left out.
    pub fn saved_jobs(&self) -> Vec<(&SavedJob, &Job)> {
        let Some(user) = self.current_user.as_ref() else {
            return Vec::new();
        };
        self.saved_jobs
            .iter()
            .filter(|s| s.user_id == user.id)
            .filter_map(|s| self.get_job(&s.job_id).map(|j| (s, j)))
            .collect()
    }

    // --- Profiles ---

    pub fn profile(&self) -> Option<&UserProfile> {
        let user = self.current_user.as_ref()?;
        self.profiles.iter().find(|p| p.id == user.id)
    }

    /// Stores the profile for the current user. The id is always the
    /// current user's id, whatever the caller passed.
    pub fn update_profile(&mut self, mut profile: UserProfile) -> StoreResult<()> {
        let user_id = self.require_user_id()?;
        profile.id = user_id.clone();
        match self.profiles.iter_mut().find(|p| p.id == user_id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        info!(user_id = %user_id, "profile updated");
        persist(self.storage.as_mut(), USER_PROFILES_KEY, &self.profiles);
        Ok(())
    }

    // --- Dashboards ---

    pub fn job_seeker_stats(&self) -> StoreResult<JobSeekerStats> {
        let user = self.require_user()?;
        Ok(stats::job_seeker_stats(&user.id, &self.applications, &self.saved_jobs))
    }

    pub fn employer_stats(&self, company_id: &str) -> EmployerStats {
        stats::employer_stats(company_id, &self.jobs, &self.applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, SqliteStorage};
    use anyhow::anyhow;

    fn seeker() -> User {
        seed::users()
            .into_iter()
            .find(|u| u.role == UserRole::JobSeeker)
            .unwrap()
    }

    fn employer() -> User {
        seed::users()
            .into_iter()
            .find(|u| u.role == UserRole::Employer)
            .unwrap()
    }

    fn store_as(user: Option<User>) -> DataStore {
        let mut store = DataStore::open(Box::new(MemoryStorage::new()));
        store.set_current_user(user);
        store
    }

    fn draft(title: &str) -> JobDraft {
        JobDraft {
            title: title.to_string(),
            location: "Remote".to_string(),
            job_type: JobType::Remote,
            salary: None,
            description: "Build things".to_string(),
            requirements: vec![],
            tags: vec!["rust".to_string()],
            department: None,
            status: JobStatus::Active,
        }
    }

    struct FailingStorage;

    impl LocalStorage for FailingStorage {
        fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&mut self, key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("quota exceeded writing {}", key))
        }
        fn remove_item(&mut self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
        fn keys(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_get_job_finds_seeded_job() {
        let store = store_as(None);
        assert_eq!(store.get_job("job-1").unwrap().title, "Senior Frontend Developer");
        assert!(store.get_job("job-missing").is_none());
    }

    #[test]
    fn test_search_matches_title_company_description_and_tags() {
        let store = store_as(None);
        let results = store.search_jobs("react", &JobFilters::default());

        let expected: Vec<&str> = store
            .jobs()
            .iter()
            .filter(|j| {
                j.title.to_lowercase().contains("react")
                    || j.company.name.to_lowercase().contains("react")
                    || j.description.to_lowercase().contains("react")
                    || j.tags.iter().any(|t| t.to_lowercase().contains("react"))
            })
            .map(|j| j.id.as_str())
            .collect();
        let ids: Vec<&str> = results.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert_eq!(ids, vec!["job-1", "job-4"]);

        let by_company = store.search_jobs("DATAFLOW", &JobFilters::default());
        assert_eq!(by_company.len(), 2);
    }

    #[test]
    fn test_search_empty_query_keeps_insertion_order() {
        let store = store_as(None);
        let ids: Vec<&str> = store
            .search_jobs("  ", &JobFilters::default())
            .iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(ids, vec!["job-1", "job-2", "job-3", "job-4", "job-5"]);
    }

    #[test]
    fn test_search_applies_exact_filters() {
        let store = store_as(None);

        let remote = JobFilters {
            job_type: Some(JobType::Remote),
            ..Default::default()
        };
        let ids: Vec<&str> = store.search_jobs("", &remote).iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["job-2"]);

        let in_remote_location = JobFilters {
            location: Some("remote".to_string()),
            ..Default::default()
        };
        assert_eq!(store.search_jobs("", &in_remote_location).len(), 2);

        let dataflow_writer = JobFilters {
            company_id: Some("company-2".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = store
            .search_jobs("writer", &dataflow_writer)
            .iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(ids, vec!["job-5"]);
    }

    #[test]
    fn test_apply_requires_login() {
        let mut store = store_as(None);
        let err = store.apply_to_job("job-1", None).unwrap_err();
        assert_eq!(err, StoreError::NotLoggedIn);
        assert_eq!(err.to_string(), "User must be logged in");
    }

    #[test]
    fn test_apply_twice_fails_on_second_attempt() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-1", Some("Hello".to_string())).unwrap();
        assert_eq!(app.status, ApplicationStatus::New);
        assert_eq!(app.cover_letter.as_deref(), Some("Hello"));
        assert_eq!(store.get_job("job-1").unwrap().application_count, 1);

        let err = store.apply_to_job("job-1", None).unwrap_err();
        assert_eq!(err.to_string(), "You have already applied to this job");
        assert_eq!(store.get_job("job-1").unwrap().application_count, 1);
        assert_eq!(store.my_applications().len(), 1);
    }

    #[test]
    fn test_apply_again_after_withdrawal_succeeds() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-2", None).unwrap();
        store.withdraw_application(&app.id).unwrap();
        assert!(!store.has_applied("job-2"));

        let again = store.apply_to_job("job-2", None).unwrap();
        assert_ne!(again.id, app.id);
        assert_eq!(store.get_job("job-2").unwrap().application_count, 1);
    }

    #[test]
    fn test_withdraw_decrements_count_at_most_once() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-3", None).unwrap();
        assert_eq!(store.get_job("job-3").unwrap().application_count, 1);

        store.withdraw_application(&app.id).unwrap();
        assert_eq!(
            store.get_application(&app.id).unwrap().status,
            ApplicationStatus::Withdrawn
        );
        assert_eq!(store.get_job("job-3").unwrap().application_count, 0);

        store.withdraw_application(&app.id).unwrap();
        assert_eq!(store.get_job("job-3").unwrap().application_count, 0);
    }

    #[test]
    fn test_withdraw_never_goes_below_zero() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-4", None).unwrap();
        store.jobs.iter_mut().find(|j| j.id == "job-4").unwrap().application_count = 0;

        store.withdraw_application(&app.id).unwrap();
        assert_eq!(store.get_job("job-4").unwrap().application_count, 0);
    }

    #[test]
    fn test_withdraw_unknown_application_fails() {
        let mut store = store_as(Some(seeker()));
        let err = store.withdraw_application("app-nope").unwrap_err();
        assert_eq!(err, StoreError::ApplicationNotFound("app-nope".to_string()));
    }

    #[test]
    fn test_save_twice_creates_one_entry() {
        let mut store = store_as(Some(seeker()));
        store.save_job("job-1").unwrap();
        store.save_job("job-1").unwrap();
        assert!(store.is_job_saved("job-1"));
        assert_eq!(store.saved_jobs().len(), 1);
        assert_eq!(store.saved_jobs.len(), 1);
    }

    #[test]
    fn test_unsave_not_saved_is_noop() {
        let mut store = store_as(Some(seeker()));
        store.save_job("job-2").unwrap();
        store.unsave_job("job-5").unwrap();
        assert_eq!(store.saved_jobs.len(), 1);

        store.unsave_job("job-2").unwrap();
        assert!(!store.is_job_saved("job-2"));
        assert!(store.saved_jobs.is_empty());
    }

    #[test]
    fn test_saved_jobs_are_per_user() {
        let mut store = store_as(Some(seeker()));
        store.save_job("job-1").unwrap();
        store.set_current_user(Some(employer()));
        assert!(!store.is_job_saved("job-1"));
        store.set_current_user(None);
        assert!(!store.is_job_saved("job-1"));
    }

    #[test]
    fn test_update_status_accepts_any_transition() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-1", None).unwrap();

        store.set_current_user(Some(employer()));
        store
            .update_application_status(&app.id, ApplicationStatus::Offered)
            .unwrap();
        store
            .update_application_status(&app.id, ApplicationStatus::New)
            .unwrap();
        store
            .update_application_status(&app.id, ApplicationStatus::Hired)
            .unwrap();
        assert_eq!(
            store.get_application(&app.id).unwrap().status,
            ApplicationStatus::Hired
        );
    }

    #[test]
    fn test_orphaned_applications_are_filtered_out() {
        let mut store = store_as(Some(seeker()));
        store.apply_to_job("job-1", None).unwrap();
        store.apply_to_job("job-2", None).unwrap();
        store.save_job("job-2").unwrap();

        store.set_current_user(Some(employer()));
        store.delete_job("job-2").unwrap();

        store.set_current_user(Some(seeker()));
        let mine = store.my_applications();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].1.id, "job-1");
        assert!(store.saved_jobs().is_empty());
        // no cascade
        assert_eq!(store.applications.len(), 2);
        assert_eq!(store.saved_jobs.len(), 1);
    }

    #[test]
    fn test_employer_can_only_manage_own_jobs() {
        let mut store = store_as(Some(employer()));
        let err = store.update_job_status("job-3", JobStatus::Closed).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        store.update_job_status("job-1", JobStatus::Paused).unwrap();
        assert_eq!(store.get_job("job-1").unwrap().status, JobStatus::Paused);
    }

    #[test]
    fn test_post_job_uses_employer_company() {
        let mut store = store_as(Some(employer()));
        let job = store.post_job(draft("Platform Engineer")).unwrap();
        assert_eq!(job.company.id, "company-1");
        assert_eq!(store.jobs_for_company("company-1").len(), 3);

        store.set_current_user(Some(seeker()));
        assert!(matches!(
            store.post_job(draft("Nope")).unwrap_err(),
            StoreError::Forbidden(_)
        ));
    }

    #[test]
    fn test_application_notes_clamp_rating() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-1", None).unwrap();
        store.set_current_user(Some(employer()));
        store
            .add_application_notes(&app.id, Some("Strong portfolio".to_string()), Some(9))
            .unwrap();
        let stored = store.get_application(&app.id).unwrap();
        assert_eq!(stored.rating, Some(5));
        assert_eq!(stored.notes.as_deref(), Some("Strong portfolio"));
    }

    #[test]
    fn test_update_profile_forces_current_user_id() {
        let mut store = store_as(Some(seeker()));
        let mut profile = store.profile().cloned().unwrap();
        profile.id = "someone-else".to_string();
        profile.headline = Some("Staff engineer".to_string());
        store.update_profile(profile).unwrap();

        let stored = store.profile().unwrap();
        assert_eq!(stored.id, "user-1");
        assert_eq!(stored.headline.as_deref(), Some("Staff engineer"));
        assert_eq!(store.profiles.len(), 1);
    }

    #[test]
    fn test_state_survives_reopen_through_sqlite() {
        let path = std::env::temp_dir().join(format!("jobboard-store-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let app_id = {
            let mut store = DataStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
            store.set_current_user(Some(seeker()));
            store.save_job("job-3").unwrap();
            store.apply_to_job("job-3", None).unwrap().id
        };

        let mut store = DataStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
        store.set_current_user(Some(seeker()));
        assert!(store.is_job_saved("job-3"));
        assert_eq!(store.get_application(&app_id).unwrap().job_id, "job-3");
        assert_eq!(store.get_job("job-3").unwrap().application_count, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_collection_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.set_item(APPLICATIONS_KEY, "[{broken").unwrap();
        storage.set_item(JOBS_KEY, "not json").unwrap();
        let store = DataStore::open(Box::new(storage));
        assert!(store.applications.is_empty());
        assert_eq!(store.jobs().len(), 5);
    }

    #[test]
    fn test_write_failures_do_not_fail_operations() {
        let mut store = DataStore::open(Box::new(FailingStorage));
        store.set_current_user(Some(seeker()));
        let app = store.apply_to_job("job-1", None).unwrap();
        store.save_job("job-1").unwrap();
        assert_eq!(store.my_applications()[0].0.id, app.id);
        assert!(store.is_job_saved("job-1"));
    }

    #[test]
    fn test_reset_restores_seed_and_logs_out() {
        let mut store = store_as(Some(seeker()));
        store.apply_to_job("job-1", None).unwrap();
        store.reset();
        assert!(store.current_user().is_none());
        assert!(store.applications.is_empty());
        assert_eq!(store.get_job("job-1").unwrap().application_count, 0);
    }

    #[test]
    fn test_job_seeker_cannot_review_own_application() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-1", None).unwrap();

        let err = store
            .update_application_status(&app.id, ApplicationStatus::Hired)
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        let err = store
            .add_application_notes(&app.id, Some("great".to_string()), Some(5))
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let stored = store.get_application(&app.id).unwrap();
        assert_eq!(stored.status, ApplicationStatus::New);
        assert_eq!(stored.notes, None);
    }

    #[test]
    fn test_employer_cannot_review_other_company_applications() {
        let mut store = store_as(Some(seeker()));
        let other = store.apply_to_job("job-3", None).unwrap();

        store.set_current_user(Some(employer()));
        assert!(matches!(
            store
                .update_application_status(&other.id, ApplicationStatus::Rejected)
                .unwrap_err(),
            StoreError::Forbidden(_)
        ));
        assert!(matches!(
            store
                .add_application_notes(&other.id, Some("no".to_string()), None)
                .unwrap_err(),
            StoreError::Forbidden(_)
        ));
        assert!(matches!(
            store.applications_for_job("job-3").unwrap_err(),
            StoreError::Forbidden(_)
        ));
        assert_eq!(
            store.get_application(&other.id).unwrap().status,
            ApplicationStatus::New
        );
    }

    #[test]
    fn test_review_unknown_application_fails() {
        let mut store = store_as(Some(employer()));
        assert_eq!(
            store
                .update_application_status("app-nope", ApplicationStatus::Reviewed)
                .unwrap_err(),
            StoreError::ApplicationNotFound("app-nope".to_string())
        );
    }

    #[test]
    fn test_applications_for_job_lists_only_that_job() {
        let mut store = store_as(Some(seeker()));
        let first = store.apply_to_job("job-1", None).unwrap();
        store.apply_to_job("job-2", None).unwrap();

        store.set_current_user(None);
        assert_eq!(
            store.applications_for_job("job-1").unwrap_err(),
            StoreError::NotLoggedIn
        );

        store.set_current_user(Some(employer()));
        let received = store.applications_for_job("job-1").unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, first.id);
        assert!(store.applications_for_job("job-5").is_err());
        assert_eq!(
            store.applications_for_job("job-missing").unwrap_err(),
            StoreError::JobNotFound("job-missing".to_string())
        );
    }

    #[test]
    fn test_record_job_view_counts_and_ignores_unknown_ids() {
        let mut store = store_as(None);
        store.record_job_view("job-2");
        store.record_job_view("job-2");
        store.record_job_view("job-missing");
        assert_eq!(store.get_job("job-2").unwrap().view_count, 2);
        assert_eq!(store.get_job("job-1").unwrap().view_count, 0);
        assert!(store.get_job("job-missing").is_none());
        assert_eq!(store.jobs().len(), 5);
    }

    #[test]
    fn test_admin_reviews_any_company_application() {
        let mut store = store_as(Some(seeker()));
        let app = store.apply_to_job("job-4", None).unwrap();

        let admin = seed::users()
            .into_iter()
            .find(|u| u.role == UserRole::Admin)
            .unwrap();
        store.set_current_user(Some(admin));
        store
            .update_application_status(&app.id, ApplicationStatus::InterviewScheduled)
            .unwrap();
        assert_eq!(store.applications_for_job("job-4").unwrap().len(), 1);
    }

    #[test]
    fn test_record_job_view_persists_jobs_collection() {
        let mut store = store_as(None);
        store.record_job_view("job-3");

        let stored: Vec<Job> = read_json(store.storage.as_ref(), JOBS_KEY).unwrap().unwrap();
        let job = stored.iter().find(|j| j.id == "job-3").unwrap();
        assert_eq!(job.view_count, 1);
    }

    #[test]
    fn test_job_views_survive_reopen_through_sqlite() {
        let path = std::env::temp_dir().join(format!("jobboard-views-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut store = DataStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
            store.record_job_view("job-4");
            store.record_job_view("job-4");
            store.record_job_view("job-4");
        }

        let store = DataStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
        assert_eq!(store.get_job("job-4").unwrap().view_count, 3);
        let _ = std::fs::remove_file(&path);
    }
}
