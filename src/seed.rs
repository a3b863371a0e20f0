//! Mock data used whenever local storage holds nothing for a collection.

use chrono::{Duration, Utc};

use crate::models::{
    Company, Job, JobStatus, JobType, NewsItem, Review, SalaryRange, User, UserProfile, UserRole,
};

fn days_ago(days: i64) -> chrono::DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn companies() -> Vec<Company> {
    vec![
        Company {
            id: "company-1".to_string(),
            name: "TechCorp".to_string(),
            description: "Cloud platform for teams shipping web products.".to_string(),
            industry: "Software".to_string(),
            size: "500-1000".to_string(),
            founded: Some(2010),
            website: Some("https://techcorp.example.com".to_string()),
            location: "San Francisco, CA".to_string(),
            logo: None,
            reviews: vec![
                Review {
                    id: "review-1".to_string(),
                    author: "Senior Engineer".to_string(),
                    rating: 4,
                    title: "Great engineering culture".to_string(),
                    body: "Strong code review habits and good mentoring.".to_string(),
                    date: days_ago(40),
                },
                Review {
                    id: "review-2".to_string(),
                    author: "Product Manager".to_string(),
                    rating: 3,
                    title: "Fast paced".to_string(),
                    body: "Lots of ownership, sometimes chaotic planning.".to_string(),
                    date: days_ago(12),
                },
            ],
            news: vec![NewsItem {
                id: "news-1".to_string(),
                title: "TechCorp raises Series C".to_string(),
                summary: "New funding to expand the platform team.".to_string(),
                date: days_ago(20),
            }],
        },
        Company {
            id: "company-2".to_string(),
            name: "DataFlow".to_string(),
            description: "Streaming analytics for operations teams.".to_string(),
            industry: "Data & Analytics".to_string(),
            size: "50-200".to_string(),
            founded: Some(2016),
            website: Some("https://dataflow.example.com".to_string()),
            location: "Austin, TX".to_string(),
            logo: None,
            reviews: vec![Review {
                id: "review-3".to_string(),
                author: "Data Engineer".to_string(),
                rating: 5,
                title: "Interesting problems".to_string(),
                body: "Real scale, small team, friendly people.".to_string(),
                date: days_ago(7),
            }],
            news: vec![],
        },
        Company {
            id: "company-3".to_string(),
            name: "DesignHub".to_string(),
            description: "Design collaboration tools for product teams.".to_string(),
            industry: "Design".to_string(),
            size: "10-50".to_string(),
            founded: Some(2019),
            website: None,
            location: "New York, NY".to_string(),
            logo: None,
            reviews: vec![],
            news: vec![NewsItem {
                id: "news-2".to_string(),
                title: "DesignHub launches plugin marketplace".to_string(),
                summary: "Third-party plugins now available to all plans.".to_string(),
                date: days_ago(3),
            }],
        },
    ]
}

pub fn jobs(companies: &[Company]) -> Vec<Job> {
    let profile = |id: &str| {
        companies
            .iter()
            .find(|c| c.id == id)
            .map(Company::profile)
    };

    let listings = [
        (
            "job-1",
            "Senior Frontend Developer",
            "company-1",
            "San Francisco, CA",
            JobType::FullTime,
            Some((140_000, 180_000)),
            "Build the dashboard experience of our cloud platform with React and TypeScript.",
            &["react", "typescript", "frontend"][..],
            Some("Engineering"),
            5,
        ),
        (
            "job-2",
            "Backend Engineer",
            "company-1",
            "Remote",
            JobType::Remote,
            Some((130_000, 170_000)),
            "Design APIs and services powering deployments for thousands of teams.",
            &["rust", "postgres", "backend"][..],
            Some("Engineering"),
            2,
        ),
        (
            "job-3",
            "Data Engineer",
            "company-2",
            "Austin, TX",
            JobType::FullTime,
            Some((120_000, 150_000)),
            "Own the streaming pipelines that feed our customer analytics.",
            &["kafka", "python", "sql"][..],
            Some("Data"),
            9,
        ),
        (
            "job-4",
            "Product Designer",
            "company-3",
            "New York, NY",
            JobType::Contract,
            None,
            "Shape the editor experience alongside engineers working in React Native.",
            &["figma", "ux"][..],
            Some("Design"),
            1,
        ),
        (
            "job-5",
            "Part-time Technical Writer",
            "company-2",
            "Remote",
            JobType::PartTime,
            Some((40_000, 60_000)),
            "Write guides and API references for our analytics SDKs.",
            &["docs", "writing"][..],
            None,
            14,
        ),
    ];

    listings
        .iter()
        .filter_map(
            |(id, title, company_id, location, job_type, salary, description, tags, department, age)| {
                Some(Job {
                    id: id.to_string(),
                    title: title.to_string(),
                    company: profile(*company_id)?,
                    location: location.to_string(),
                    job_type: *job_type,
                    salary: salary.map(|(min, max)| SalaryRange {
                        min,
                        max,
                        currency: "USD".to_string(),
                    }),
                    description: description.to_string(),
                    requirements: strings(&["3+ years of relevant experience", "Clear written communication"]),
                    responsibilities: strings(&["Ship features end to end", "Review teammates' work"]),
                    benefits: strings(&["Health insurance", "Learning budget"]),
                    tags: strings(tags),
                    department: department.map(str::to_string),
                    application_count: 0,
                    view_count: 0,
                    status: JobStatus::Active,
                    posted_at: days_ago(*age),
                })
            },
        )
        .collect()
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "user-1".to_string(),
            email: "jobseeker@example.com".to_string(),
            password: "password123".to_string(),
            name: "Alex Seeker".to_string(),
            role: UserRole::JobSeeker,
            company_id: None,
            created_at: days_ago(90),
        },
        User {
            id: "user-2".to_string(),
            email: "employer@example.com".to_string(),
            password: "password123".to_string(),
            name: "Sam Recruiter".to_string(),
            role: UserRole::Employer,
            company_id: Some("company-1".to_string()),
            created_at: days_ago(120),
        },
        User {
            id: "user-3".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
            name: "Admin".to_string(),
            role: UserRole::Admin,
            company_id: None,
            created_at: days_ago(365),
        },
    ]
}

pub fn profiles() -> Vec<UserProfile> {
    vec![UserProfile {
        id: "user-1".to_string(),
        name: "Alex Seeker".to_string(),
        email: "jobseeker@example.com".to_string(),
        location: Some("Remote".to_string()),
        headline: Some("Frontend developer".to_string()),
        skills: ["react", "typescript", "css"].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_seed_job_references_a_seed_company() {
        let companies = companies();
        let jobs = jobs(&companies);
        assert_eq!(jobs.len(), 5);
        for job in &jobs {
            assert!(companies.iter().any(|c| c.id == job.company.id));
        }
    }

    #[test]
    fn test_seed_employer_belongs_to_a_company() {
        let companies = companies();
        let employer = users()
            .into_iter()
            .find(|u| u.role == UserRole::Employer)
            .unwrap();
        let company_id = employer.company_id.unwrap();
        assert!(companies.iter().any(|c| c.id == company_id));
    }
}
