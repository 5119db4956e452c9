//! The fixed job listing served by `/api/jobs`.

use serde::Serialize;

/// An open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: u32,
    pub title: &'static str,
    pub location: &'static str,
    pub description: &'static str,
}

/// The three open positions. Listing is not editable at runtime.
pub const JOB_LISTINGS: [Job; 3] = [
    Job {
        id: 1,
        title: "Software Developer",
        location: "Remote",
        description: "Full-stack developer position",
    },
    Job {
        id: 2,
        title: "UI/UX Designer",
        location: "Mumbai",
        description: "Design user interfaces",
    },
    Job {
        id: 3,
        title: "Project Manager",
        location: "Delhi",
        description: "Manage software development projects",
    },
];
