// src/seed.rs

//! Startup data: the configured admin account and the demo mentor directory.

use sqlx::{SqlitePool, types::Json};

use crate::{config::Config, error::AppError, utils::hash::hash_password};

struct DemoMentor {
    name: &'static str,
    domain: &'static str,
    skills: [&'static str; 3],
    bio: &'static str,
    experience: &'static str,
    linkedin: &'static str,
    github: &'static str,
    hourly_rate: f64,
    availability: &'static str,
}

const DEMO_MENTORS: [DemoMentor; 8] = [
    DemoMentor {
        name: "Aarav Shah",
        domain: "Machine Learning",
        skills: ["Python", "TensorFlow", "Django"],
        bio: "Senior ML Engineer with 8 years of AI experience.",
        experience: "8 years",
        linkedin: "https://linkedin.com/in/aaravshah",
        github: "https://github.com/aaravml",
        hourly_rate: 80.0,
        availability: "Mon-Fri, 10am-7pm IST",
    },
    DemoMentor {
        name: "Ishita Verma",
        domain: "Data Science",
        skills: ["Python", "Pandas", "Cloud Computing"],
        bio: "Data Scientist with a passion for predictive analytics.",
        experience: "6 years",
        linkedin: "https://linkedin.com/in/ishitaverma",
        github: "https://github.com/ishitads",
        hourly_rate: 70.0,
        availability: "Mon-Sat, 9am-6pm IST",
    },
    DemoMentor {
        name: "Rahul Mehta",
        domain: "Web Development",
        skills: ["JavaScript", "React", "Node.js"],
        bio: "Full-stack developer and backend lead at TechNova.",
        experience: "7 years",
        linkedin: "https://linkedin.com/in/rahulmehta",
        github: "https://github.com/rahuldev",
        hourly_rate: 65.0,
        availability: "Flexible hours",
    },
    DemoMentor {
        name: "Neha Gupta",
        domain: "Cloud Computing",
        skills: ["AWS", "Python", "C++"],
        bio: "Cloud Architect specializing in scalable infrastructure.",
        experience: "9 years",
        linkedin: "https://linkedin.com/in/nehagupta",
        github: "https://github.com/nehacloud",
        hourly_rate: 85.0,
        availability: "Mon-Fri, 11am-8pm IST",
    },
    DemoMentor {
        name: "Ananya Patel",
        domain: "Mobile Development",
        skills: ["Kotlin", "Java", "Android"],
        bio: "Android Engineer building intuitive mobile experiences.",
        experience: "5 years",
        linkedin: "https://linkedin.com/in/ananyapatel",
        github: "https://github.com/ananyadev",
        hourly_rate: 60.0,
        availability: "Mon-Sat, 10am-7pm IST",
    },
    DemoMentor {
        name: "Karan Singh",
        domain: "DevOps",
        skills: ["Docker", "Kubernetes", "CI/CD"],
        bio: "DevOps Specialist focused on automation and CI/CD pipelines.",
        experience: "8 years",
        linkedin: "https://linkedin.com/in/karansingh",
        github: "https://github.com/karanops",
        hourly_rate: 75.0,
        availability: "Mon-Fri, 9am-6pm IST",
    },
    DemoMentor {
        name: "Meera Das",
        domain: "UI/UX Design",
        skills: ["Figma", "Adobe XD", "Design Systems"],
        bio: "UI/UX Designer passionate about intuitive user experiences.",
        experience: "6 years",
        linkedin: "https://linkedin.com/in/meeradas",
        github: "https://github.com/meeraux",
        hourly_rate: 55.0,
        availability: "Mon-Sat, 10am-6pm IST",
    },
    DemoMentor {
        name: "Rohit Khanna",
        domain: "Product Management",
        skills: ["Agile", "Scrum", "Leadership"],
        bio: "Product Manager with 10 years of experience leading tech teams.",
        experience: "10 years",
        linkedin: "https://linkedin.com/in/rohitkhanna",
        github: "https://github.com/rohitpm",
        hourly_rate: 90.0,
        availability: "Mon-Fri, 9am-7pm IST",
    },
];

/// Runs every seeding step. Failures are logged, never fatal.
pub async fn run(pool: &SqlitePool, config: &Config) {
    if let Err(e) = seed_admin_user(pool, config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    if config.seed_mentors {
        if let Err(e) = seed_demo_mentors(pool).await {
            tracing::warn!("Could not seed mentors: {:?}", e);
        }
    }
}

async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if exists.is_none() {
        tracing::info!("Seeding admin user: {}", email);
        let hashed_password = hash_password(password)?;

        sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, 'admin')")
            .bind("Admin")
            .bind(email)
            .bind(hashed_password)
            .execute(pool)
            .await?;
        tracing::info!("Admin user created successfully.");
    }
    Ok(())
}

/// Fills an empty directory with unowned demo mentors.
///
/// They start unrated: a mentor's rating is always derived from feedback rows.
async fn seed_demo_mentors(pool: &SqlitePool) -> Result<(), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mentors")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::debug!("Mentors table already has {} rows, skipping seed", count);
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for mentor in &DEMO_MENTORS {
        sqlx::query(
            r#"
            INSERT INTO mentors (
                name, domain, skills, bio, experience,
                linkedin, github, hourly_rate, availability
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(mentor.name)
        .bind(mentor.domain)
        .bind(Json(mentor.skills))
        .bind(mentor.bio)
        .bind(mentor.experience)
        .bind(mentor.linkedin)
        .bind(mentor.github)
        .bind(mentor.hourly_rate)
        .bind(mentor.availability)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!("Seeded {} demo mentors", DEMO_MENTORS.len());
    Ok(())
}
