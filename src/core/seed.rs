// src/core/seed.rs
//! Sample accounts and postings for a fresh database

use anyhow::{Context, Result};
use tracing::info;

use crate::auth::hash_password;
use crate::core::jobs::{JobDraft, JobRepository};
use crate::core::users::{NewUser, UserRepository, UserType};
use crate::core::Database;

pub const SAMPLE_PASSWORD: &str = "password123";

#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { users: usize, jobs: usize },
    AlreadyPopulated,
}

/// Insert the sample data unless the users table already has rows
pub async fn seed_sample_data(db: &Database, bcrypt_cost: u32) -> Result<SeedOutcome> {
    let users = UserRepository::new(db.pool());

    if users.count().await? > 0 {
        info!("Database already contains data, skipping sample data");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let password_hash = hash_password(SAMPLE_PASSWORD, bcrypt_cost).await?;

    users
        .create(&NewUser {
            username: "jobseeker".to_string(),
            email: "jobseeker@example.com".to_string(),
            password_hash: password_hash.clone(),
            user_type: UserType::JobSeeker,
            full_name: "John Doe".to_string(),
            phone: "+1234567890".to_string(),
        })
        .await
        .context("Failed to create sample job seeker")?;

    let employer = users
        .create(&NewUser {
            username: "employer".to_string(),
            email: "employer@example.com".to_string(),
            password_hash,
            user_type: UserType::Employer,
            full_name: "Jane Smith".to_string(),
            phone: "+0987654321".to_string(),
        })
        .await
        .context("Failed to create sample employer")?;

    let sample_jobs = [
        JobDraft {
            title: "Python Developer".to_string(),
            description: "We are looking for an experienced Python developer...".to_string(),
            requirements: "Python, Flask, SQLAlchemy, 3+ years experience".to_string(),
            location: "New York, NY".to_string(),
            salary: "$80,000 - $120,000".to_string(),
            company: "Tech Corp".to_string(),
        },
        JobDraft {
            title: "Frontend Developer".to_string(),
            description: "Join our team as a frontend developer...".to_string(),
            requirements: "JavaScript, React, HTML, CSS, 2+ years experience".to_string(),
            location: "San Francisco, CA".to_string(),
            salary: "$70,000 - $110,000".to_string(),
            company: "Web Solutions".to_string(),
        },
        JobDraft {
            title: "Data Scientist".to_string(),
            description: "Exciting opportunity for a data scientist...".to_string(),
            requirements: "Python, Machine Learning, Statistics, PhD preferred".to_string(),
            location: "Boston, MA".to_string(),
            salary: "$90,000 - $140,000".to_string(),
            company: "Data Analytics Inc".to_string(),
        },
    ];

    let jobs = JobRepository::new(db.pool());
    for draft in &sample_jobs {
        jobs.create(employer.id, draft)
            .await
            .with_context(|| format!("Failed to create sample job '{}'", draft.title))?;
    }

    Ok(SeedOutcome::Seeded {
        users: 2,
        jobs: sample_jobs.len(),
    })
}
